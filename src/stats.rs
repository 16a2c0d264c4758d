use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub total: u32,
    pub mastered: u32,
    /// Items not mastered yet.
    pub learning: u32,
    /// Learning items whose review is due.
    pub due_now: u32,
    /// Correct answers over the past month.
    pub correct: u32,
    /// Wrong answers over the past month.
    pub wrong: u32,
}

impl ProgressStats {
    /// Share of correct answers over the past month, as a percentage. 100 when nothing was
    /// answered.
    pub fn accuracy(&self) -> f32 {
        let num_answered = self.correct + self.wrong;

        if num_answered > 0 {
            self.correct as f32 / num_answered as f32 * 100.0
        } else {
            100.0
        }
    }
}

impl fmt::Display for ProgressStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} / {} mastered", self.mastered, self.total)?;
        writeln!(f, "{} learning, {} due now", self.learning, self.due_now)?;

        writeln!(
            f,
            "Past month accuracy: {:.0}% ({} / {})",
            self.accuracy(),
            self.correct,
            self.correct + self.wrong,
        )
    }
}
