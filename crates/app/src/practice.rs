//! Interactive quiz and flashcard loops over a line-oriented terminal.

use std::fmt::Display;
use std::io::{self, Write};

use lingo_core::model::Category;
use rand::Rng;
use services::{
    AppServices, FlashcardService, FlashcardSession, QuizOutcome, QuizService, QuizSession,
    QuizStep, QuizSubmission, SessionError,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Reads answers line by line and writes prompts and feedback.
pub struct Prompt<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    /// Trimmed reply, or `None` once input is exhausted.
    pub async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.out, "{question}")?;
        self.out.flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_owned()))
    }

    pub async fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let reply = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(reply.is_some_and(|r| r.eq_ignore_ascii_case("y")))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}

/// Store failures are worth retrying; session misuse and auth are not.
fn is_retryable(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::Storage(_)
            | SessionError::Progress(_)
            | SessionError::Ledger(_)
            | SessionError::Catalog(_)
    )
}

async fn offer_retry<R, W>(prompt: &mut Prompt<R, W>, err: SessionError) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if !is_retryable(&err) {
        return Err(err.into());
    }
    prompt.say(format_args!("could not save progress: {err}"))?;
    if prompt.confirm("Retry?").await? {
        Ok(())
    } else {
        Err(err.into())
    }
}

/// Map a typed reply onto an option: a 1-based number, or the option text itself.
fn pick_option(options: &[String], reply: &str) -> String {
    let by_number = reply
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i));
    if let Some(option) = by_number {
        return option.clone();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(reply))
        .cloned()
        .unwrap_or_else(|| reply.to_owned())
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Run quizzes until the learner declines another round or input ends.
pub async fn run_quiz<R, W, G>(
    services: &AppServices,
    category: Option<Category>,
    prompt: &mut Prompt<R, W>,
    rng: &mut G,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    G: Rng + ?Sized,
{
    let quiz = services.quiz();
    let mut session = quiz.start(category, rng).await?;

    loop {
        let Some(outcome) = play_quiz(&quiz, &mut session, prompt).await? else {
            return Ok(());
        };
        prompt.say(format_args!(
            "\nQuiz complete: {}/{} correct, +{} xp",
            outcome.correct_answers, outcome.total_questions, outcome.xp_earned
        ))?;
        if !prompt.confirm("Play again?").await? {
            return Ok(());
        }
        quiz.retry(&mut session, rng).await?;
    }
}

async fn play_quiz<R, W>(
    quiz: &QuizService,
    session: &mut QuizSession,
    prompt: &mut Prompt<R, W>,
) -> AppResult<Option<QuizOutcome>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let Some(question) = session.current_question().cloned() else {
            return Ok(None);
        };
        let entry = question.entry();

        prompt.say(format_args!(
            "\n[{}/{}] {}",
            session.index() + 1,
            session.total_questions(),
            entry.word()
        ))?;
        if let Some(pronunciation) = entry.pronunciation() {
            prompt.say(format_args!("  ({pronunciation})"))?;
        }
        for (n, option) in question.options().iter().enumerate() {
            prompt.say(format_args!("  {}. {option}", n + 1))?;
        }

        let hint = if question.options().is_empty() {
            "translation> "
        } else {
            "answer> "
        };
        let Some(reply) = prompt.ask(hint).await? else {
            return Ok(None);
        };
        let answer = pick_option(question.options(), &reply);

        let submission = loop {
            match quiz.submit_answer(session, &answer).await {
                Ok(submission) => break submission,
                Err(err) => offer_retry(prompt, err).await?,
            }
        };
        if let Some(QuizSubmission {
            is_correct,
            correct_answer,
            advance,
            ..
        }) = submission
        {
            if is_correct {
                prompt.say("Correct!")?;
            } else {
                prompt.say(format_args!("Not quite, it is \"{correct_answer}\""))?;
            }
            if let (Some(sentence), Some(meaning)) =
                (entry.example_sentence(), entry.example_translation())
            {
                prompt.say(format_args!("  {sentence} / {meaning}"))?;
            }
            advance.elapsed().await;
        }

        let step = loop {
            match quiz.advance(session).await {
                Ok(step) => break step,
                Err(err) => offer_retry(prompt, err).await?,
            }
        };
        if let QuizStep::Completed(outcome) = step {
            return Ok(Some(outcome));
        }
    }
}

//
// ─── FLASHCARDS ────────────────────────────────────────────────────────────────
//

/// Run flashcard rounds until the learner stops or input ends.
pub async fn run_flashcards<R, W, G>(
    services: &AppServices,
    category: Option<Category>,
    prompt: &mut Prompt<R, W>,
    rng: &mut G,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    G: Rng + ?Sized,
{
    let flashcards = services.flashcards();
    let mut session = flashcards.start(category, rng).await?;

    loop {
        if !play_flashcards(&flashcards, &mut session, prompt).await? {
            return Ok(());
        }
        prompt.say(format_args!(
            "\nRound complete: {}/{} judged right",
            session.correct_count(),
            session.total_cards()
        ))?;
        if !prompt.confirm("Another round?").await? {
            return Ok(());
        }
        flashcards.restart(&mut session, rng).await?;
    }
}

/// `false` when input ended before the last card.
async fn play_flashcards<R, W>(
    flashcards: &FlashcardService,
    session: &mut FlashcardSession,
    prompt: &mut Prompt<R, W>,
) -> AppResult<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    prompt.say("y = the translation is right, n = it is wrong, f = flip the card")?;
    while let Some(card) = session.current_card() {
        let word = card.entry().word().to_owned();
        let shown = card.shown_translation().to_owned();
        let truth = card.entry().translation().to_owned();

        prompt.say(format_args!(
            "\n[{}/{}] {word}  =  {shown} ?",
            session.index() + 1,
            session.total_cards()
        ))?;

        let says_true = loop {
            let Some(reply) = prompt.ask("> ").await? else {
                return Ok(false);
            };
            match reply.to_ascii_lowercase().as_str() {
                "y" | "yes" | "t" | "true" => break true,
                "n" | "no" | "false" => break false,
                "f" | "flip" => {
                    if session.flip() {
                        prompt.say(format_args!("  back of card: {truth}"))?;
                    } else {
                        prompt.say(format_args!("  front of card: {word}"))?;
                    }
                }
                _ => prompt.say("  answer y, n or f")?,
            }
        };

        let outcome = loop {
            match flashcards.submit_judgment(session, says_true).await {
                Ok(outcome) => break outcome,
                Err(err) => offer_retry(prompt, err).await?,
            }
        };
        if outcome.user_is_right {
            prompt.say("Right!")?;
        } else {
            prompt.say(format_args!("Wrong, {word} means \"{}\"", outcome.true_translation))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::PracticeSettings;
    use lingo_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;
    use storage::repository::Storage;

    use crate::seed::seed_catalog;

    async fn seeded_services() -> AppServices {
        let storage = Storage::in_memory();
        let clock = fixed_clock();
        seed_catalog(storage.vocabulary.as_ref(), &clock)
            .await
            .unwrap();
        let settings = PracticeSettings::new(4, 3, 15, 10, Duration::ZERO).unwrap();
        let services = AppServices::new(&storage, clock, settings);
        services.accounts().sign_up(Some("tester".into())).await.unwrap();
        services
    }

    fn scripted(input: &str) -> Prompt<&[u8], Vec<u8>> {
        Prompt::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn replies_map_to_options() {
        let options: Vec<String> = ["Red", "Blue", "Green"].map(String::from).into();
        assert_eq!(pick_option(&options, "2"), "Blue");
        assert_eq!(pick_option(&options, "green"), "Green");
        assert_eq!(pick_option(&options, "9"), "9");
        assert_eq!(pick_option(&[], "merah"), "merah");
    }

    #[tokio::test]
    async fn scripted_quiz_records_one_result() {
        let services = seeded_services().await;
        let mut prompt = scripted("1\n1\n1\n1\nn\n");
        let mut rng = StdRng::seed_from_u64(7);

        run_quiz(&services, None, &mut prompt, &mut rng).await.unwrap();

        let results = services.quiz().recent_results(10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result.total_questions(), 4);

        let out = String::from_utf8(prompt.into_output()).unwrap();
        assert!(out.contains("[4/4]"));
        assert!(out.contains("Quiz complete"));
    }

    #[tokio::test]
    async fn quiz_stops_quietly_when_input_ends() {
        let services = seeded_services().await;
        let mut prompt = scripted("1\n");
        let mut rng = StdRng::seed_from_u64(7);

        run_quiz(&services, None, &mut prompt, &mut rng).await.unwrap();

        assert!(services.quiz().recent_results(10).await.unwrap().is_empty());
        assert_eq!(services.progress().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn scripted_flashcards_finish_every_card() {
        let services = seeded_services().await;
        let mut prompt = scripted("f\nf\ny\n?\nn\ny\nn\n");
        let mut rng = StdRng::seed_from_u64(11);

        run_flashcards(&services, Some(Category::Food), &mut prompt, &mut rng)
            .await
            .unwrap();

        assert_eq!(services.progress().list().await.unwrap().len(), 3);
        let profile = services.ledger().profile().await.unwrap();
        assert_eq!(profile.streak_days(), 1);

        let out = String::from_utf8(prompt.into_output()).unwrap();
        assert!(out.contains("back of card"));
        assert!(out.contains("front of card"));
        assert!(out.contains("answer y, n or f"));
        assert!(out.contains("Round complete"));
    }
}
