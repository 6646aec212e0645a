//! Session controller: one per tool, owning that tool's pipeline state.
//!
//! ```text
//!  Idle ──select──▶ Parsing ──ok──▶ Ready ──submit──▶ Submitting ──▶ Succeeded | Failed
//!   ▲                  │ err                                              │
//!   └──────────────────┘◀──────────── select / edit / reset ─────────────┘
//! ```
//!
//! The state is never stored directly. It is derived from a single record
//! (inputs, pending tickets, last outcome) held behind a mutex that is never
//! held across an `.await`.
//!
//! ## Tickets
//!
//! Every selection, edit, submit and reset draws a fresh ticket from a
//! per-session counter. A decode or submit remembers its ticket and, on
//! completion, only writes back if its ticket is still the current one for
//! that slot (or for the submit). Otherwise the completion is discarded and
//! the call returns `Ok(None)`. The latest action started wins, regardless of
//! which finishes first.
//!
//! Selecting a file or editing text also invalidates an in-flight submit and
//! clears the previous result or error.

use crate::config::ToolConfig;
use crate::error::LegalDocError;
use crate::execute::execute;
use crate::output::OperationResult;
use crate::pipeline::decode::FormatDecoder;
use crate::pipeline::input::{Document, NormalizedText};
use crate::pipeline::request::{OperationRequest, TemplateKind};
use crate::pipeline::transport::{GeminiClient, GenerationService};
use crate::present::Presentation;
use crate::progress::{self, ProgressCallback, Stage};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// The three tools. Each gets its own [`SessionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Identify clauses in one contract.
    ClauseExtractor,
    /// Compare two versions of a contract.
    VersionComparer,
    /// Draft a contract from a template and free-form details.
    DraftGenerator,
}

impl Tool {
    /// Verb phrase used in failure messages ("Failed to {action}.").
    pub fn action(&self) -> &'static str {
        match self {
            Tool::ClauseExtractor => "extract clauses",
            Tool::VersionComparer => "compare versions",
            Tool::DraftGenerator => "generate the contract",
        }
    }

    /// Input slots this tool reads, in order.
    pub fn slots(&self) -> &'static [InputSlot] {
        match self {
            Tool::VersionComparer => &[InputSlot::Primary, InputSlot::Secondary],
            Tool::ClauseExtractor | Tool::DraftGenerator => &[InputSlot::Primary],
        }
    }

    fn missing_input(&self) -> LegalDocError {
        let what = match self {
            Tool::ClauseExtractor => "some contract text to analyze",
            Tool::VersionComparer => "both versions of the contract text",
            Tool::DraftGenerator => "some details for the contract",
        };
        LegalDocError::MissingInput { what: what.into() }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::ClauseExtractor => "clause extractor",
            Tool::VersionComparer => "version comparer",
            Tool::DraftGenerator => "draft generator",
        })
    }
}

/// An input position within a tool.
///
/// For the version comparer `Primary` is the earlier version (A) and
/// `Secondary` the later one (B). The other tools only use `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSlot {
    Primary,
    Secondary,
}

impl InputSlot {
    fn index(self) -> usize {
        match self {
            InputSlot::Primary => 0,
            InputSlot::Secondary => 1,
        }
    }
}

/// Observable state of a session, derived from its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Parsing,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Parsing => "parsing",
            SessionState::Ready => "ready",
            SessionState::Submitting => "submitting",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
struct SlotRecord {
    filename: Option<String>,
    text: Option<NormalizedText>,
    pending: Option<u64>,
}

impl SlotRecord {
    fn has_text(&self) -> bool {
        self.text.as_ref().is_some_and(|t| !t.is_blank())
    }
}

#[derive(Debug, Default)]
struct PipelineState {
    slots: [SlotRecord; 2],
    template: TemplateKind,
    pending_submit: Option<u64>,
    /// Outcome of the last completed submit.
    outcome: Option<Result<OperationResult, LegalDocError>>,
    /// Last decode failure; cleared by the next action.
    input_error: Option<LegalDocError>,
    last_ticket: u64,
}

impl PipelineState {
    fn ticket(&mut self) -> u64 {
        self.last_ticket += 1;
        self.last_ticket
    }

    fn discard_results(&mut self) {
        self.pending_submit = None;
        self.outcome = None;
        self.input_error = None;
    }

    fn state(&self) -> SessionState {
        if self.pending_submit.is_some() {
            SessionState::Submitting
        } else if self.slots.iter().any(|s| s.pending.is_some()) {
            SessionState::Parsing
        } else {
            match &self.outcome {
                Some(Ok(_)) => SessionState::Succeeded,
                Some(Err(_)) => SessionState::Failed,
                None if self.slots.iter().any(SlotRecord::has_text) => SessionState::Ready,
                None => SessionState::Idle,
            }
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// One input slot as seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    pub slot: InputSlot,
    /// Name of the selected file, `None` for typed text.
    pub filename: Option<String>,
    pub text: Option<NormalizedText>,
    pub parsing: bool,
}

/// A consistent copy of a session's record.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub tool: Tool,
    pub state: SessionState,
    pub template: TemplateKind,
    pub inputs: Vec<SlotSnapshot>,
    pub result: Option<OperationResult>,
    /// The submit failure, or the last decode failure.
    pub error: Option<LegalDocError>,
}

impl SessionSnapshot {
    pub fn input(&self, slot: InputSlot) -> Option<&SlotSnapshot> {
        self.inputs.iter().find(|s| s.slot == slot)
    }
}

// ── Controller ───────────────────────────────────────────────────────────────

/// Drives one tool's pipeline. Cheap to share behind an `Arc`.
pub struct SessionController {
    tool: Tool,
    decoder: FormatDecoder,
    service: Arc<dyn GenerationService>,
    progress: Option<ProgressCallback>,
    record: Mutex<PipelineState>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("tool", &self.tool)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Create a session for `tool`.
    ///
    /// Uses `config.service` when set, otherwise an HTTP client for the
    /// configured endpoint. Decoding goes through the process-wide
    /// collaborators; see [`SessionController::with_decoder`] to override.
    pub fn new(tool: Tool, config: &ToolConfig) -> Result<Self, LegalDocError> {
        let service: Arc<dyn GenerationService> = match &config.service {
            Some(service) => Arc::clone(service),
            None => Arc::new(GeminiClient::new(config)?),
        };
        Ok(Self {
            tool,
            decoder: FormatDecoder::default(),
            service,
            progress: config.progress_callback.clone(),
            record: Mutex::new(PipelineState::default()),
        })
    }

    pub fn with_decoder(mut self, decoder: FormatDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    fn record(&self) -> MutexGuard<'_, PipelineState> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_slot(&self, slot: InputSlot) -> Result<(), LegalDocError> {
        if self.tool.slots().contains(&slot) {
            Ok(())
        } else {
            Err(LegalDocError::Internal(format!(
                "the {} has no {:?} input",
                self.tool, slot
            )))
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────────

    /// Select an already-built document and decode it into `slot`.
    ///
    /// Returns `Ok(None)` when a later action superseded this one.
    pub async fn select_document(
        &self,
        slot: InputSlot,
        document: Document,
    ) -> Result<Option<NormalizedText>, LegalDocError> {
        let ticket = self.begin_decode(slot, document.filename())?;
        let outcome = self.decode_tracked(&document).await;
        self.finish_decode(slot, ticket, outcome)
    }

    /// Select a file by name and contents. Unsupported extensions fail
    /// before any decoding.
    pub async fn select_file(
        &self,
        slot: InputSlot,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Option<NormalizedText>, LegalDocError> {
        let filename = filename.into();
        let ticket = self.begin_decode(slot, &filename)?;
        let outcome = match Document::new(filename, bytes) {
            Ok(document) => self.decode_tracked(&document).await,
            Err(e) => Err(e),
        };
        self.finish_decode(slot, ticket, outcome)
    }

    /// Read a file from disk and decode it into `slot`.
    pub async fn select_path(
        &self,
        slot: InputSlot,
        path: impl AsRef<Path>,
    ) -> Result<Option<NormalizedText>, LegalDocError> {
        let path = path.as_ref();
        let ticket = self.begin_decode(slot, &path.display().to_string())?;
        let outcome = match Document::from_path(path).await {
            Ok(document) => self.decode_tracked(&document).await,
            Err(e) => Err(e),
        };
        self.finish_decode(slot, ticket, outcome)
    }

    /// Replace `slot` with typed or pasted text.
    ///
    /// Supersedes any in-flight decode for the slot and any in-flight submit.
    pub fn set_text(&self, slot: InputSlot, text: impl Into<String>) -> Result<(), LegalDocError> {
        self.check_slot(slot)?;
        let mut record = self.record();
        record.ticket();
        record.slots[slot.index()] = SlotRecord {
            filename: None,
            text: Some(NormalizedText::new(text)),
            pending: None,
        };
        record.discard_results();
        Ok(())
    }

    /// Choose the contract template used by the draft generator.
    pub fn set_template(&self, template: TemplateKind) {
        let mut record = self.record();
        if record.template != template {
            record.ticket();
            record.template = template;
            record.discard_results();
        }
    }

    fn begin_decode(&self, slot: InputSlot, filename: &str) -> Result<u64, LegalDocError> {
        self.check_slot(slot)?;
        let mut record = self.record();
        let ticket = record.ticket();
        record.slots[slot.index()] = SlotRecord {
            filename: Some(filename.to_string()),
            text: None,
            pending: Some(ticket),
        };
        record.discard_results();
        debug!("{}: decoding '{}' (ticket {})", self.tool, filename, ticket);
        Ok(ticket)
    }

    async fn decode_tracked(&self, document: &Document) -> Result<NormalizedText, LegalDocError> {
        if let Some(cb) = &self.progress {
            cb.on_stage_start(Stage::Decode);
        }
        let outcome = self.decoder.decode(document).await;
        progress::report(self.progress.as_ref(), Stage::Decode, &outcome);
        outcome
    }

    fn finish_decode(
        &self,
        slot: InputSlot,
        ticket: u64,
        outcome: Result<NormalizedText, LegalDocError>,
    ) -> Result<Option<NormalizedText>, LegalDocError> {
        let mut record = self.record();
        let current = &mut record.slots[slot.index()];
        if current.pending != Some(ticket) {
            debug!("{}: discarding stale decode (ticket {})", self.tool, ticket);
            return Ok(None);
        }
        current.pending = None;

        match outcome {
            Ok(text) => {
                current.text = Some(text.clone());
                Ok(Some(text))
            }
            Err(e) => {
                warn!("{}: {}", self.tool, e);
                current.filename = None;
                current.text = None;
                record.input_error = Some(e.clone());
                Err(e)
            }
        }
    }

    // ── Submit ──────────────────────────────────────────────────────────

    /// Run the full pipeline over the current inputs.
    ///
    /// Always starts from the stored text; nothing is memoised between
    /// submits. Returns `Ok(None)` when a later action superseded this run.
    pub async fn submit(&self) -> Result<Option<OperationResult>, LegalDocError> {
        let (ticket, request) = {
            let mut record = self.record();
            let ticket = record.ticket();
            record.discard_results();
            match self.operation_request(&record) {
                Ok(request) => {
                    record.pending_submit = Some(ticket);
                    (ticket, request)
                }
                Err(e) => {
                    record.outcome = Some(Err(e.clone()));
                    return Err(e);
                }
            }
        };

        info!("{}: submitting (ticket {})", self.tool, ticket);
        let outcome = execute(&request, self.service.as_ref(), self.progress.as_ref()).await;

        let mut record = self.record();
        if record.pending_submit != Some(ticket) {
            debug!("{}: discarding stale submit (ticket {})", self.tool, ticket);
            return Ok(None);
        }
        record.pending_submit = None;
        record.outcome = Some(outcome.clone());

        match outcome {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!("{}: submit failed: {}", self.tool, e);
                Err(e)
            }
        }
    }

    fn operation_request(&self, record: &PipelineState) -> Result<OperationRequest, LegalDocError> {
        let text = |slot: InputSlot| {
            let s = &record.slots[slot.index()];
            s.has_text().then(|| s.text.clone()).flatten()
        };

        match self.tool {
            Tool::ClauseExtractor => text(InputSlot::Primary)
                .map(|source| OperationRequest::Extract { source })
                .ok_or_else(|| self.tool.missing_input()),
            Tool::VersionComparer => match (text(InputSlot::Primary), text(InputSlot::Secondary)) {
                (Some(before), Some(after)) => Ok(OperationRequest::Compare { before, after }),
                _ => Err(self.tool.missing_input()),
            },
            Tool::DraftGenerator => text(InputSlot::Primary)
                .map(|details| OperationRequest::Generate {
                    template: record.template,
                    details,
                })
                .ok_or_else(|| self.tool.missing_input()),
        }
    }

    /// Discard all inputs, results and in-flight work.
    pub fn reset(&self) {
        let mut record = self.record();
        let last_ticket = record.ticket();
        *record = PipelineState {
            last_ticket,
            ..PipelineState::default()
        };
        debug!("{}: reset", self.tool);
    }

    // ── Observation ─────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.record().state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let record = self.record();
        let (result, error) = match &record.outcome {
            Some(Ok(result)) => (Some(result.clone()), None),
            Some(Err(e)) => (None, Some(e.clone())),
            None => (None, record.input_error.clone()),
        };
        SessionSnapshot {
            tool: self.tool,
            state: record.state(),
            template: record.template,
            inputs: self
                .tool
                .slots()
                .iter()
                .map(|&slot| {
                    let s = &record.slots[slot.index()];
                    SlotSnapshot {
                        slot,
                        filename: s.filename.clone(),
                        text: s.text.clone(),
                        parsing: s.pending.is_some(),
                    }
                })
                .collect(),
            result,
            error,
        }
    }

    /// What the UI should show right now.
    pub fn presentation(&self) -> Presentation {
        Presentation::from_snapshot(&self.snapshot())
    }
}
