// Demo runner with steps for the classic "vowels" example specification.

use anyhow::{ensure, Context};
use gauge_runner::{StepRegistry, Table};
use std::process::ExitCode;
use std::sync::Arc;

use vowels::Vowels;

fn main() -> ExitCode {
    let vowels = Arc::new(Vowels::default());

    let registry = StepRegistry::new()
        .step("Vowels in English language are {}.", {
            let vowels = vowels.clone();
            move |letters: String| vowels.set(&letters)
        })
        .step("The word {} has {} vowels.", {
            let vowels = vowels.clone();
            move |word: String, expected: usize| -> anyhow::Result<()> {
                let actual = vowels.count(&word);
                ensure!(
                    actual == expected,
                    "'{word}' has {actual} vowels, expected {expected}"
                );
                Ok(())
            }
        })
        .step("Almost all words have vowels {}", {
            let vowels = vowels.clone();
            move |words: Table| -> anyhow::Result<()> {
                for row in 0..words.len() {
                    let word = words.get(row, "Word").context("missing 'Word' column")?;
                    let expected: usize = words
                        .get(row, "Vowel Count")
                        .context("missing 'Vowel Count' column")?
                        .parse()
                        .with_context(|| format!("bad vowel count in row {row}"))?;
                    let actual = vowels.count(word);
                    ensure!(
                        actual == expected,
                        "'{word}' has {actual} vowels, expected {expected}"
                    );
                }
                Ok(())
            }
        });

    gauge_runner::run(registry)
}

mod vowels {
    use parking_lot::RwLock;

    /// The vowel set configured by the specification.
    #[derive(Debug)]
    pub struct Vowels {
        letters: RwLock<Vec<char>>,
    }

    impl Default for Vowels {
        fn default() -> Self {
            Self {
                letters: RwLock::new("aeiou".chars().collect()),
            }
        }
    }

    impl Vowels {
        pub fn set(&self, letters: &str) {
            *self.letters.write() = letters.chars().filter(|c| c.is_alphabetic()).collect();
        }

        pub fn count(&self, word: &str) -> usize {
            let letters = self.letters.read();
            word.chars()
                .filter(|c| letters.contains(&c.to_ascii_lowercase()))
                .count()
        }
    }
}
