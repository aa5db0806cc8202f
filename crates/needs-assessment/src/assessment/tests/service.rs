use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::assessment::domain::{AssessmentError, InvalidReference, SessionId};
use crate::assessment::evaluation::{ComplexityTier, OwnershipModel};
use crate::assessment::repository::{RepositoryError, SessionRepository, SinkError};
use crate::assessment::service::{
    AssessmentService, AssessmentServiceError, FlowTiming, StepOutcome,
};
use crate::assessment::QuestionSet;

fn complete_standard_session(
    service: &AssessmentService<MemoryRepository, MemorySink>,
) -> (SessionId, StepOutcome) {
    let snapshot = service.start().expect("session starts");
    let id = snapshot.session_id;
    for (question, option) in [(1, "opt1"), (2, "opt3"), (3, "opt3"), (4, "opt3"), (5, "opt1")] {
        service
            .select(&id, q(question), &opt(option))
            .expect("selection recorded");
        service.next(&id).expect("next");
    }
    match service.snapshot(&id) {
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("completed session should be discarded, got {other:?}"),
    }
    let result = service.claim_result(&id).expect("result delivered");
    (id, StepOutcome::Complete(Box::new(result)))
}

#[test]
fn start_issues_unique_sessions() {
    let (service, repository, _) = build_service();

    let first = service.start().expect("first session");
    let second = service.start().expect("second session");

    assert_ne!(first.session_id, second.session_id);
    assert!(first.session_id.0.starts_with("asm-"));
    assert_eq!(first.step, 0);
    assert_eq!(first.scores.complexity, 0);
    assert_eq!(repository.len(), 2);
}

#[test]
fn select_persists_scores_between_calls() {
    let (service, _, _) = build_service();
    let id = service.start().expect("session").session_id;

    service.select(&id, q(1), &opt("opt2")).expect("select");
    let snapshot = service.select(&id, q(3), &opt("opt3")).expect("select");

    assert_eq!(snapshot.scores.complexity, 80);
    assert_eq!(snapshot.scores.independence, -2);
    assert_eq!(service.snapshot(&id).expect("snapshot"), snapshot);
}

#[test]
fn select_propagates_invalid_reference() {
    let (service, _, _) = build_service();
    let id = service.start().expect("session").session_id;

    match service.select(&id, q(2), &opt("opt7")) {
        Err(AssessmentServiceError::Assessment(AssessmentError::InvalidReference(
            InvalidReference::Option { question_id, .. },
        ))) => assert_eq!(question_id, q(2)),
        other => panic!("expected invalid reference, got {other:?}"),
    }
}

#[test]
fn operations_on_unknown_session_are_not_found() {
    let (service, _, _) = build_service();
    let missing = SessionId("asm-missing".to_string());

    assert!(matches!(
        service.select(&missing, q(1), &opt("opt1")),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.next(&missing),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.claim_result(&missing),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn next_blocks_on_unanswered_step() {
    let (service, _, _) = build_service();
    let id = service.start().expect("session").session_id;

    match service.next(&id).expect("next") {
        StepOutcome::Blocked(snapshot) => {
            assert_eq!(snapshot.step, 0);
            assert!(!snapshot.can_go_forward);
        }
        other => panic!("expected blocked step, got {other:?}"),
    }
}

#[test]
fn back_keeps_previous_answers() {
    let (service, _, _) = build_service();
    let id = service.start().expect("session").session_id;
    service.select(&id, q(1), &opt("opt3")).expect("select");
    service.next(&id).expect("next");

    let snapshot = service.back(&id).expect("back");

    assert_eq!(snapshot.step, 0);
    assert_eq!(snapshot.scores.complexity, 80);
    let question = snapshot.question.expect("question");
    assert!(question.options[2].selected);
}

#[test]
fn completing_hands_result_to_sink_once() {
    let (service, repository, sink) = build_service();
    let snapshot = service.start().expect("session starts");
    let id = snapshot.session_id;

    let mut finished = None;
    for (question, option) in [(1, "opt1"), (2, "opt3"), (3, "opt3"), (4, "opt3"), (5, "opt1")] {
        service
            .select(&id, q(question), &opt(option))
            .expect("selection recorded");
        if let StepOutcome::Complete(result) = service.next(&id).expect("next") {
            finished = Some(result);
        }
    }

    let result = finished.expect("final step completes");
    assert_eq!(result.scores.complexity, 75);
    assert_eq!(result.scores.independence, 0);
    assert_eq!(result.recommendation.complexity_tier, ComplexityTier::High);
    assert_eq!(result.recommendation.ownership_model, OwnershipModel::Owned);
    assert_eq!(repository.len(), 0);
    assert_eq!(sink.delivered().len(), 1);

    let claimed = service.claim_result(&id).expect("claimed");
    assert_eq!(claimed, *result);
    assert!(matches!(
        service.claim_result(&id),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn restarting_after_completion_begins_from_scratch() {
    let (service, _, _) = build_service();
    let (finished_id, outcome) = complete_standard_session(&service);
    assert!(matches!(outcome, StepOutcome::Complete(_)));

    let fresh = service.start().expect("new session");

    assert_ne!(fresh.session_id, finished_id);
    assert_eq!(fresh.step, 0);
    assert_eq!(fresh.scores.complexity, 0);
    assert_eq!(fresh.scores.independence, 0);
}

#[test]
fn auto_advance_moves_single_select_steps() {
    let (service, _, _) = build_service();
    let id = service.start().expect("session").session_id;
    let snapshot = service.select(&id, q(1), &opt("opt2")).expect("select");
    assert_eq!(snapshot.auto_advance_after_ms, Some(400));

    match service.auto_advance(&id, 0).expect("auto") {
        StepOutcome::InProgress(snapshot) => assert_eq!(snapshot.step, 1),
        other => panic!("expected to advance, got {other:?}"),
    }
    assert!(matches!(
        service.auto_advance(&id, 0).expect("stale"),
        StepOutcome::Blocked(_)
    ));
}

#[test]
fn sink_failures_surface_to_the_caller() {
    let repository = MemoryRepository::default();
    let service = AssessmentService::new(
        QuestionSet::standard(),
        Arc::new(repository.clone()),
        Arc::new(OfflineSink),
        FlowTiming::default(),
    );
    let id = service.start().expect("session").session_id;
    for (question, option) in [(1, "opt1"), (2, "opt1"), (3, "opt1"), (4, "opt1")] {
        service.select(&id, q(question), &opt(option)).expect("select");
        service.next(&id).expect("next");
    }
    service.select(&id, q(5), &opt("opt2")).expect("select");

    assert!(matches!(
        service.next(&id),
        Err(AssessmentServiceError::Sink(SinkError::Transport(_)))
    ));
    let snapshot = service.snapshot(&id).expect("session kept for retry");
    assert_eq!(snapshot.step, 4);
    assert!(snapshot.can_go_forward);
}

#[test]
fn abandon_discards_the_session() {
    let (service, repository, sink) = build_service();
    let id = service.start().expect("session").session_id;
    service.select(&id, q(1), &opt("opt2")).expect("select");

    service.abandon(&id).expect("abandon");

    assert_eq!(repository.len(), 0);
    assert!(sink.delivered().is_empty());
    assert!(matches!(
        service.select(&id, q(2), &opt("opt1")),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.abandon(&id),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
}

fn gated_service(
    callers: usize,
) -> (
    AssessmentService<GatedRepository, MemorySink>,
    Arc<GatedRepository>,
    MemorySink,
) {
    let repository = Arc::new(GatedRepository::new(callers));
    let sink = MemorySink::default();
    let service = AssessmentService::new(
        QuestionSet::standard(),
        Arc::clone(&repository),
        Arc::new(sink.clone()),
        instant_timing(),
    );
    (service, repository, sink)
}

#[test]
fn racing_finishes_deliver_a_single_result() {
    let (service, repository, sink) = gated_service(2);
    let mut prepared = session();
    answer_all(&mut prepared);
    for _ in 0..4 {
        prepared.go_forward().expect("forward");
    }
    let id = prepared.id().clone();
    repository.inner.insert(prepared).expect("insert");

    let (clicked, timer) = thread::scope(|scope| {
        let clicked = scope.spawn(|| service.next(&id));
        let timer = scope.spawn(|| service.auto_advance(&id, 4));
        (
            clicked.join().expect("next thread"),
            timer.join().expect("auto-advance thread"),
        )
    });

    let completed = [&clicked, &timer]
        .into_iter()
        .filter(|outcome| matches!(outcome, Ok(StepOutcome::Complete(_))))
        .count();
    assert_eq!(completed, 1, "next={clicked:?} auto={timer:?}");
    for outcome in [&clicked, &timer] {
        assert!(matches!(
            outcome,
            Ok(StepOutcome::Complete(_))
                | Err(AssessmentServiceError::Assessment(
                    AssessmentError::SessionComplete
                ))
                | Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
        ));
    }
    assert_eq!(sink.delivered().len(), 1);
    assert_eq!(repository.inner.len(), 0);
}

#[test]
fn concurrent_toggles_are_both_kept() {
    let (service, repository, _) = gated_service(2);
    let prepared = session();
    let id = prepared.id().clone();
    repository.inner.insert(prepared).expect("insert");

    thread::scope(|scope| {
        let first = scope.spawn(|| service.select(&id, q(4), &opt("opt2")));
        let second = scope.spawn(|| service.select(&id, q(4), &opt("opt3")));
        first.join().expect("first thread").expect("first toggle");
        second.join().expect("second thread").expect("second toggle");
    });

    let snapshot = service.snapshot(&id).expect("snapshot");
    assert_eq!(snapshot.scores.complexity, 40);
}
