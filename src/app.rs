use crate::prompt;
use anyhow::Result;
use std::time::Instant;
use time::OffsetDateTime;
use time::macros::format_description;
use vocab_srs::ItemKey;
use vocab_srs::Jitter;
use vocab_srs::Outcome;
use vocab_srs::ReviewState;
use vocab_srs::Reviewer;
use vocab_srs::SqliteStore;
use vocab_srs::UtcClock;

pub type CliReviewer = Reviewer<SqliteStore, UtcClock, Box<dyn Jitter>>;

pub struct App {
    reviewer: CliReviewer,
}

impl App {
    pub fn new(reviewer: CliReviewer) -> Self {
        Self { reviewer }
    }

    pub fn init(&self) -> Result<()> {
        self.reviewer.store().init()?;

        println!("Initialized");
        Ok(())
    }

    pub fn review(&mut self, user_id: String, item_id: String, outcome: &Outcome) -> Result<()> {
        let key = ItemKey::new(user_id, item_id);

        let state = self.reviewer.answer(&key, outcome)?;

        self.print_state(&key, &state)
    }

    pub fn study(&mut self, user_id: &str, limit: u32) -> Result<()> {
        let due = self.reviewer.due(user_id, false, limit)?;
        let num_items = due.len();

        println!("{num_items} items to review");

        let mut num_correct = 0;

        for (item_id, _) in due {
            println!("\n{item_id}\n");

            let started = Instant::now();
            prompt::any("Press any key once you've recalled it")?;
            let response_time_ms = u32::try_from(started.elapsed().as_millis()).unwrap_or(u32::MAX);

            let is_correct = prompt::binary("Correct?")?;
            let difficulty = prompt::difficulty()?;

            let next = self.reviewer.answer(
                &ItemKey::new(user_id, item_id),
                &Outcome {
                    is_correct,
                    response_time_ms: Some(response_time_ms),
                    difficulty,
                },
            )?;

            if is_correct {
                num_correct += 1;
            }

            println!("Next review {}", format_date(next.next_review_at)?);
        }

        println!("\nAnswered {num_correct}/{num_items} correctly");

        Ok(())
    }

    pub fn due(&self, user_id: &str, mastered: bool, limit: u32) -> Result<()> {
        for (item_id, state) in self.reviewer.due(user_id, mastered, limit)? {
            println!(
                "{item_id} level {} due {}",
                state.mastery_level,
                format_date(state.next_review_at)?
            );
        }

        Ok(())
    }

    pub fn show(&self, user_id: String, item_id: String) -> Result<()> {
        let key = ItemKey::new(user_id, item_id);

        let state = self.reviewer.state(&key)?;

        self.print_state(&key, &state)
    }

    pub fn stats(&self, user_id: &str) -> Result<()> {
        let stats = self.reviewer.stats(user_id)?;

        print!("{stats}");

        Ok(())
    }

    pub fn remove(&mut self, user_id: String, item_id: String) -> Result<()> {
        let key = ItemKey::new(user_id, item_id);

        // Fails early for unknown items, before asking
        self.reviewer.state(&key)?;

        if prompt::binary(format!("Are you sure you want to forget '{key}'?"))? {
            self.reviewer.remove(&key)?;
            println!("... removed.");
        }

        Ok(())
    }

    fn print_state(&self, key: &ItemKey, state: &ReviewState) -> Result<()> {
        println!("{key}");
        println!(
            "  level {} / {}{}",
            state.mastery_level,
            self.reviewer.scheduler().max_level(),
            if state.is_mastered { " (mastered)" } else { "" }
        );
        println!(
            "  {} / {} correct",
            state.times_correct, state.times_seen
        );
        println!(
            "  interval {} days, ease {:.2}",
            state.interval_days, state.ease_factor
        );
        println!("  next review {}", format_date(state.next_review_at)?);

        Ok(())
    }
}

fn format_date(date_time: OffsetDateTime) -> Result<String> {
    Ok(date_time.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute] UTC"
    ))?)
}
