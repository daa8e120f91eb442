//! Integration tests for the project/event CRUD and trigger API.
//!
//! These require a PostgreSQL instance and exercise the full HTTP surface.

#[cfg(test)]
mod tests {
    /// Test creating a project then listing it with a name filter.
    #[test]
    fn test_create_and_filter_projects() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. Start test server with fresh database
        // 2. POST /projects with name "site", full_name "acme/site"
        // 3. GET /projects?name=si
        // 4. Assert the created project is returned, total=1
        // 5. GET /projects?name=zzz and assert total=0
    }

    /// Test project creation rejects empty required fields.
    #[test]
    fn test_create_project_validation() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. POST /projects with an empty script
        // 2. Assert 400 with error=VALIDATION_ERROR
        // 3. Assert GET /projects shows nothing was persisted
    }

    /// Test a github trigger creates exactly one pending event.
    #[test]
    fn test_github_trigger_creates_pending_event() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. Create a project tracking acme/site@main
        // 2. POST /triggers/github with a push payload for refs/heads/main
        // 3. Assert 202 with a new event_id
        // 4. GET /events?project_id=... and assert exactly one event,
        //    type=2, branch=main, commit from the payload
    }

    /// Test a trigger for an untracked repo resolves to UNKNOWN_PROJECT.
    #[test]
    fn test_unresolvable_trigger_creates_no_event() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. POST /triggers/github for a repo no project tracks
        // 2. Assert 404 with error=UNKNOWN_PROJECT
        // 3. Assert GET /events returns no new event
    }

    /// Test operator correction is limited to status and status_message.
    #[test]
    fn test_event_update_is_limited_to_status_fields() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. Create a project and trigger an event
        // 2. PUT /events/{id} with status "archived" and a message
        // 3. Assert 200 and the new labels round-trip on GET
        // 4. Assert stdout/stderr/commit are unchanged
    }

    /// Test same-project events execute strictly in order.
    #[test]
    fn test_same_project_events_serialize() {
        // TODO: Implement when test infrastructure is set up
        // This test should:
        // 1. Create a project whose script appends to a shared file with sleeps
        // 2. Trigger two events back to back
        // 3. Wait for both to reach a terminal status
        // 4. Assert the file shows no interleaving (running intervals disjoint)
    }
}
