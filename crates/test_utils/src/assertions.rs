//! Custom Test Assertions
//!
//! Assertion helpers that print the answers alongside the failure.

use domain_claims::{
    AnswerField, AnswerModel, ClaimRoute, EvidenceType, RouteResult, RoutingError,
    RoutingResolver, WizardError, WizardStep,
};

/// Asserts that `answers` route to `expected`
///
/// # Returns
///
/// The full route result for further checks
pub fn assert_routes_to(
    resolver: &RoutingResolver,
    answers: &AnswerModel,
    expected: ClaimRoute,
) -> RouteResult {
    match resolver.resolve(answers) {
        Ok(result) => {
            assert_eq!(
                result.route, expected,
                "Unexpected route for answers {:?}",
                answers
            );
            result
        }
        Err(e) => panic!("Expected route {}, got error {:?} for answers {:?}", expected, e, answers),
    }
}

/// Asserts the route result asks for exactly these evidence types
pub fn assert_evidence(result: &RouteResult, expected: &[EvidenceType]) {
    let actual: Vec<EvidenceType> = result.required_evidence.iter().copied().collect();
    let mut expected = expected.to_vec();
    expected.sort();
    assert_eq!(
        actual, expected,
        "Evidence mismatch for route {}",
        result.route
    );
}

/// Asserts that routing stops on the given missing field
pub fn assert_incomplete(resolver: &RoutingResolver, answers: &AnswerModel, field: AnswerField) {
    assert_eq!(
        resolver.resolve(answers),
        Err(RoutingError::IncompleteAnswers { field }),
        "Expected {} to be reported missing for answers {:?}",
        field,
        answers
    );
}

/// Asserts that an advance was rejected on `step`
pub fn assert_cannot_advance<T: std::fmt::Debug>(result: Result<T, WizardError>, step: WizardStep) {
    match result {
        Err(WizardError::CannotAdvance { step: actual, .. }) => assert_eq!(
            actual, step,
            "CannotAdvance reported for the wrong step"
        ),
        other => panic!("Expected CannotAdvance on step {}, got {:?}", step, other),
    }
}
