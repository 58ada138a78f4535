//! Interactive drill loop: one prompt per queued word, persisting after
//! every judgment so a killed process resumes exactly where it stopped.

use std::io::{BufRead, Write};

use anyhow::Result;

use lexdrill_core::time::{date_key, now_unix_ms};
use lexdrill_core::{Judgment, JudgmentOutcome, SessionState, Vocabulary};

use crate::App;

enum Input {
    Judge(Judgment),
    Quit,
    Unrecognized,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "m" => Input::Judge(Judgment::Mastered),
        "u" => Input::Judge(Judgment::Uncertain),
        "f" => Input::Judge(Judgment::Forgot),
        "q" => Input::Quit,
        _ => Input::Unrecognized,
    }
}

pub fn run(
    app: &App,
    vocab: &mut Vocabulary,
    mut session: SessionState,
    input: &mut impl BufRead,
) -> Result<()> {
    app.store
        .save_session(&session)
        .map_err(|e| anyhow::anyhow!("failed to save session: {e}"))?;

    while !session.finished {
        let Some(word_id) = session.current_word() else {
            break;
        };

        // Word deleted since the session was persisted: purge and move on
        if !vocab.contains(word_id) {
            let out = session.record_judgment(vocab, word_id, Judgment::Forgot, now_unix_ms());
            persist(app, &session)?;
            handle_bonuses(app, &session, out)?;
            continue;
        }

        let term = vocab.get(word_id).map(|w| w.term.clone()).unwrap_or_default();
        println!(
            "\n[{}/{}] {term}",
            session.attempted(),
            session.initial_count
        );
        print!("(m)astered (u)ncertain (f)orgot (q)uit > ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        let n = input.read_line(&mut line)?;
        if n == 0 {
            // EOF behaves like quit: session stays resumable
            println!("\nsession saved — `lexdrill resume` to continue");
            return Ok(());
        }

        let judgment = match parse_input(&line) {
            Input::Judge(j) => j,
            Input::Quit => {
                println!("session saved — `lexdrill resume` to continue");
                return Ok(());
            }
            Input::Unrecognized => {
                println!("m = knew it, u = unsure, f = forgot, q = quit");
                continue;
            }
        };

        let now = now_unix_ms();
        let out = session.record_judgment(vocab, word_id, judgment, now);

        if !out.skipped {
            if let Some(word) = vocab.get(word_id) {
                app.store
                    .update_word(word)
                    .map_err(|e| anyhow::anyhow!("failed to save word: {e}"))?;

                if matches!(judgment, Judgment::Forgot | Judgment::Uncertain)
                    && let Some(def) = &word.definition
                {
                    println!("  {def}");
                }
            }
            app.store
                .increment_history(&date_key(now))
                .map_err(|e| anyhow::anyhow!("failed to record history: {e}"))?;
        }

        persist(app, &session)?;
        handle_bonuses(app, &session, out)?;
    }

    Ok(())
}

fn persist(app: &App, session: &SessionState) -> Result<()> {
    app.store
        .save_session(session)
        .map_err(|e| anyhow::anyhow!("failed to save session: {e}"))
}

fn handle_bonuses(app: &App, session: &SessionState, out: JudgmentOutcome) -> Result<()> {
    if out.first_try_mastery {
        let total = app
            .store
            .add_points(app.config.first_try_bonus)
            .map_err(|e| anyhow::anyhow!("failed to award points: {e}"))?;
        println!("  +{} first-try bonus ({total} total)", app.config.first_try_bonus);
    }

    if out.session_completed {
        let total = app
            .store
            .add_points(app.config.completion_bonus)
            .map_err(|e| anyhow::anyhow!("failed to award points: {e}"))?;
        println!(
            "\nsession complete: {} word(s), {} judgment(s)",
            session.initial_count,
            session.attempt_counts.values().sum::<u32>()
        );
        println!(
            "  +{} completion bonus ({total} total)",
            app.config.completion_bonus
        );
        println!("`lexdrill again` to repeat, `lexdrill next` for a new batch");
    }

    Ok(())
}
