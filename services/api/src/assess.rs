use crate::infra::{parse_answer, AnswerArg};
use clap::Args;
use needs_assessment::assessment::{
    AssessmentError, AssessmentResult, AssessmentSession, Forward, QuestionSet, SessionId,
};
use needs_assessment::config::AppConfig;
use needs_assessment::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Answer as QUESTION=OPTION; repeat per question, comma-separate multi-select picks.
    #[arg(long = "answer", value_parser = parse_answer)]
    pub(crate) answers: Vec<AnswerArg>,
    /// Question set JSON file (defaults to APP_QUESTION_SET or the standard set).
    #[arg(long)]
    pub(crate) questions: Option<PathBuf>,
    /// Print the full result as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionsArgs {
    /// Question set JSON file (defaults to APP_QUESTION_SET or the standard set).
    #[arg(long)]
    pub(crate) questions: Option<PathBuf>,
    /// Print the question set as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        answers,
        questions,
        json,
    } = args;

    let questions = load_questions(questions)?;
    let result = evaluate_answers(Arc::new(questions), &answers)?;

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Result payload unavailable: {err}"),
        }
        return Ok(());
    }

    render_result(&result);
    Ok(())
}

pub(crate) fn run_question_listing(args: QuestionsArgs) -> Result<(), AppError> {
    let questions = load_questions(args.questions)?;

    if args.json {
        match serde_json::to_string_pretty(&questions) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Question payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("{} questions", questions.len());
    for question in questions.questions() {
        let mode = if question.allows_multiple_selections {
            "multi-select"
        } else {
            "single-select"
        };
        println!("- Q{} [{}] {}", question.id, mode, question.translation_key);
        for option in &question.options {
            println!(
                "    {:<8} complexity {:+4} | independence {:+3}  ({})",
                option.id,
                option.complexity_weight,
                option.independence_weight,
                option.translation_key
            );
        }
    }
    Ok(())
}

fn load_questions(path: Option<PathBuf>) -> Result<QuestionSet, AppError> {
    let questions = match path {
        Some(path) => QuestionSet::from_path(path)?,
        None => AppConfig::load()?.assessment.load_question_set()?,
    };
    Ok(questions)
}

/// Applies every answer in order, then walks the session to completion.
pub(crate) fn evaluate_answers(
    questions: Arc<QuestionSet>,
    answers: &[AnswerArg],
) -> Result<AssessmentResult, AssessmentError> {
    let mut session = AssessmentSession::new(SessionId("cli".to_string()), questions);

    for answer in answers {
        for option_id in &answer.option_ids {
            session.select_option(answer.question_id, option_id)?;
        }
    }

    if let Some(unanswered) = session.answers().first_unanswered() {
        return Err(AssessmentError::NotReady { unanswered });
    }

    loop {
        match session.go_forward()? {
            Forward::Moved { .. } => continue,
            Forward::Finished(result) => return Ok(*result),
            Forward::Stayed { step } => {
                let question = session.answers().questions().question(step);
                return Err(match question {
                    Some(question) => AssessmentError::NotReady {
                        unanswered: question.id,
                    },
                    None => AssessmentError::SessionComplete,
                });
            }
        }
    }
}

fn render_result(result: &AssessmentResult) {
    println!("Needs assessment result");
    println!(
        "Completed {} ({} questions)",
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        result.total_questions
    );
    println!("- Recommendation: {}", result.recommendation.summary());
    println!(
        "- Scores: complexity {} / 100 | independence {:+}",
        result.scores.complexity, result.scores.independence
    );
    println!("Selections:");
    for (question_id, selection) in &result.selections {
        match serde_json::to_string(selection) {
            Ok(rendered) => println!("  - Q{question_id}: {rendered}"),
            Err(err) => println!("  - Q{question_id}: unavailable ({err})"),
        }
    }
    println!("Content keys:");
    let content = &result.content;
    for (label, key) in [
        ("tier", &content.tier_title),
        ("model", &content.model_title),
        ("description", &content.model_description),
        ("price range", &content.price_range),
        ("timeline", &content.timeline),
        ("features", &content.features),
        ("best for", &content.best_for),
    ] {
        println!("  - {label}: {key}");
    }
}
