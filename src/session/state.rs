//! Session state and its update function.
//!
//! [`SessionState::update`] is the only way the state changes. It never
//! performs I/O; instead it returns the [`Effect`]s the caller should run.
//! Results of those effects come back as further [`SessionEvent`]s.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::history::{History, TextPair};
use super::share::ShareLink;
use crate::diff::{diff_words, DiffSegment};
use crate::estimate::{CostEstimate, TokenCount, TokenEstimator};
use crate::refine::{Refinement, UsageMetadata};

/// Message shown when a refine attempt fails.
pub const REFINE_FAILED_MESSAGE: &str = "Failed to refine prompt. Please try again.";

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Startup: the link to restore (if any) and the stored history.
    Loaded {
        link: Option<ShareLink>,
        history: Vec<TextPair>,
    },
    /// The user edited the input.
    InputChanged(String),
    /// The user asked for a refinement.
    SubmitRequested,
    /// The outstanding refine call succeeded.
    RefineSucceeded {
        refinement: Refinement,
        at: DateTime<Utc>,
    },
    /// The outstanding refine call failed.
    RefineFailed,
    /// The user asked to copy the output.
    CopyRequested,
    /// The clipboard accepted the text.
    CopySucceeded,
    /// The clipboard refused the text.
    CopyFailed,
    /// The acknowledgement window of copy `generation` has passed.
    CopyAckExpired { generation: u64 },
    /// Show or hide the diff view.
    DiffToggled,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send `text` to the refinement backend.
    Refine { text: String },
    /// Overwrite stored history.
    PersistHistory(Vec<TextPair>),
    /// Mirror the pair into the shareable address.
    MirrorAddress(TextPair),
    /// Write `text` to the clipboard.
    CopyToClipboard(String),
    /// Deliver [`SessionEvent::CopyAckExpired`] after `after`.
    ExpireCopyAck { generation: u64, after: Duration },
}

/// Everything the client renders from.
#[derive(Debug, Clone)]
pub struct SessionState {
    input: String,
    output: String,
    /// Usage reported for the latest refinement.
    usage: UsageMetadata,
    history: History,
    estimate: CostEstimate,
    /// Input of the outstanding refine call.
    in_flight: Option<String>,
    copied: bool,
    copy_generation: u64,
    show_diff: bool,
    error: Option<String>,
    estimator: TokenEstimator,
    copy_ack: Duration,
}

impl SessionState {
    pub fn new(estimator: TokenEstimator, copy_ack: Duration) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            usage: UsageMetadata::default(),
            history: History::default(),
            estimate: CostEstimate::default(),
            in_flight: None,
            copied: false,
            copy_generation: 0,
            show_diff: false,
            error: None,
            estimator,
            copy_ack,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn usage(&self) -> &UsageMetadata {
        &self.usage
    }

    /// Tokens and cost of the latest refinement, when the service reported
    /// its usage.
    pub fn actual_cost(&self) -> Option<(TokenCount, f64)> {
        let count = self.usage.token_count()?;
        Some((count, self.estimator.rates().actual_cost(count)))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Live estimate for the current input.
    pub fn estimate(&self) -> CostEstimate {
        self.estimate
    }

    /// A refine call is outstanding.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Submitting would start a request.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.input.trim().is_empty()
    }

    /// The "copied" acknowledgement is showing.
    pub fn is_copied(&self) -> bool {
        self.copied
    }

    pub fn show_diff(&self) -> bool {
        self.show_diff
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Diff between input and output, when both exist.
    pub fn diff(&self) -> Option<Vec<DiffSegment>> {
        if self.input.is_empty() || self.output.is_empty() {
            return None;
        }
        Some(diff_words(&self.input, &self.output))
    }

    /// Apply `event` and return the effects to run.
    pub fn update(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Loaded { link, history } => {
                self.history = History::from_entries(history);
                if let Some(link) = link {
                    if let Some(input) = link.input().filter(|s| !s.is_empty()) {
                        self.set_input(input);
                    }
                    if let Some(output) = link.output().filter(|s| !s.is_empty()) {
                        self.output = output;
                    }
                }
                Vec::new()
            }
            SessionEvent::InputChanged(input) => {
                self.set_input(input);
                Vec::new()
            }
            SessionEvent::SubmitRequested => {
                if !self.can_submit() {
                    return Vec::new();
                }
                self.error = None;
                self.in_flight = Some(self.input.clone());
                vec![Effect::Refine {
                    text: self.input.clone(),
                }]
            }
            SessionEvent::RefineSucceeded { refinement, at } => {
                // Nothing outstanding: a late result is discarded.
                let Some(input) = self.in_flight.take() else {
                    return Vec::new();
                };
                self.output = refinement.refined_text;
                self.usage = refinement.usage;
                let pair = TextPair::new(input, self.output.clone()).at(at);
                self.history.push(pair.clone());
                vec![
                    Effect::PersistHistory(self.history.to_vec()),
                    Effect::CopyToClipboard(self.output.clone()),
                    Effect::MirrorAddress(pair),
                ]
            }
            SessionEvent::RefineFailed => {
                if self.in_flight.take().is_some() {
                    self.error = Some(REFINE_FAILED_MESSAGE.to_string());
                }
                Vec::new()
            }
            SessionEvent::CopyRequested => {
                if self.output.is_empty() {
                    return Vec::new();
                }
                vec![Effect::CopyToClipboard(self.output.clone())]
            }
            SessionEvent::CopySucceeded => {
                self.copied = true;
                self.copy_generation += 1;
                vec![Effect::ExpireCopyAck {
                    generation: self.copy_generation,
                    after: self.copy_ack,
                }]
            }
            SessionEvent::CopyFailed => Vec::new(),
            SessionEvent::CopyAckExpired { generation } => {
                if generation == self.copy_generation {
                    self.copied = false;
                }
                Vec::new()
            }
            SessionEvent::DiffToggled => {
                self.show_diff = !self.show_diff;
                Vec::new()
            }
        }
    }

    fn set_input(&mut self, input: String) {
        self.estimate = self.estimator.estimate(&input);
        self.input = input;
    }
}
