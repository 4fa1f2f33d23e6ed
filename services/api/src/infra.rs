use metrics_exporter_prometheus::PrometheusHandle;
use preflight_risk::assessment::{
    AnswerValue, ApproachType, AssessmentError, Questionnaire, ScoringEngine,
};
use preflight_risk::config::AssessmentConfig;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<ScoringEngine>,
    pub(crate) assessment: AssessmentConfig,
}

/// Replay submitted answers into a fresh session. The first rejected answer
/// aborts the replay.
pub(crate) fn replay_answers<'a, I>(
    engine: &Arc<ScoringEngine>,
    answers: I,
    approach: Option<&str>,
) -> Result<Questionnaire, AssessmentError>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let mut session = Questionnaire::new(Arc::clone(engine));

    for (key, value) in answers {
        session.set_answer_by_key(key, AnswerValue::Flag(value))?;
    }

    if let Some(raw) = approach {
        let approach: ApproachType = raw.parse()?;
        session.set_approach(approach);
    }

    Ok(session)
}
