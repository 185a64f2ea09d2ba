use halodb_core::table::AddFailure;

/// Counts of rows skipped while adding properties, by reason.
#[derive(Clone, Debug, Default)]
pub struct Warnings {
    counts: Vec<(&'static str, usize)>,
}

impl Warnings {
    pub fn count(&self, reason: &str) -> usize {
        self.counts
            .iter()
            .find(|(r, _)| *r == reason)
            .map(|&(_, count)| count)
            .unwrap_or(0)
    }

    fn count_mut(&mut self, reason: &'static str) -> &mut usize {
        let i = match self.counts.iter().position(|(r, _)| *r == reason) {
            Some(i) => i,
            None => {
                self.counts.push((reason, 0));
                self.counts.len() - 1
            }
        };

        &mut self.counts[i].1
    }

    pub fn warn_once(&mut self, failure: &AddFailure) {
        let reason = failure.reason.reason();

        if self.count(reason) == 0 {
            let key = &failure.key;

            log::warn!(
                "Skipping row {key} due to {reason}. \
                This warning will be shown only once per reason, with a summary at the end."
            );
        }
        log::debug!("{failure}");

        *self.count_mut(reason) += 1;
    }

    pub fn summarize(&self) {
        for &(reason, count) in self.counts.iter() {
            if count > 0 {
                log::warn!("Skipped {count} rows due to {reason}.");
            }
        }
    }
}
