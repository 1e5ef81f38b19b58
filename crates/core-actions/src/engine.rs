//! Key-at-a-time driver tying the translator, dispatcher and mode
//! controller together.
//!
//! `Engine::feed` is the only entry point a host needs: it routes the key
//! through the `KeyTranslator`, dispatches completed commands, and settles
//! the mode afterwards (operator-pending falls back to its base mode, a
//! `<C-o>` command resumes Insert). Failures never escape as panics or
//! partial edits; they come back as `KeyOutcome::Bell`.

use crate::dispatcher::dispatch;
use crate::key_translator::{KeyTranslator, Translation};
use crate::{Action, CommandError, ModeChange, ResolveError};
use core_config::EngineSettings;
use core_events::{KeyEvent, KeyParseError, parse_keys};
use core_state::{
    EditorState, InsertKind, InsertSession, Mode, ModeObserver, OperatorMetricsSnapshot,
    Registers, Settled,
};
use core_text::motion::normalize_normal_mode_position;
use core_text::{Buffer, Position, TextBuffer};
use tracing::{debug, trace};

/// What happened to one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// More keys are needed to complete the command.
    Pending,
    /// A command ran (or the key was absorbed, e.g. typed text).
    Done,
    /// The command was rejected or hit the edge of the buffer.
    Bell(CommandError),
}

pub struct Engine<B: TextBuffer> {
    state: EditorState<B>,
    translator: KeyTranslator,
    settings: EngineSettings,
}

impl Engine<Buffer> {
    /// Engine over an in-memory buffer configured from `settings`.
    pub fn from_text(text: &str, settings: EngineSettings) -> anyhow::Result<Self> {
        let buffer = Buffer::from_str("[scratch]", text)?
            .with_word_chars(settings.extra_word_chars.iter().copied())
            .with_history_limit(settings.history_max);
        Ok(Self::with_settings(buffer, settings))
    }
}

impl<B: TextBuffer> Engine<B> {
    pub fn new(buffer: B) -> Self {
        Self::with_settings(buffer, EngineSettings::default())
    }

    pub fn with_settings(buffer: B, settings: EngineSettings) -> Self {
        trace!(target: "actions.engine", max_count = settings.max_count, shift_width = settings.shift_width, "engine_created");
        Self {
            state: EditorState::new(buffer),
            translator: KeyTranslator::with_max_count(settings.max_count),
            settings,
        }
    }

    pub fn feed(&mut self, key: KeyEvent) -> KeyOutcome {
        let mode = self.state.mode();
        match self.translator.feed(mode, &key) {
            Translation::Incomplete => {
                if self.translator.pending_operator().is_some() {
                    self.state.mode.begin_operator();
                }
                KeyOutcome::Pending
            }
            Translation::Dispatch(action) => {
                let delegating = matches!(action, Action::ModeChange(ModeChange::DelegateOne));
                let outcome = match dispatch(action, &mut self.state, &self.settings) {
                    Ok(r) if r.bell => self.bell(ResolveError::AtBufferEdge.into()),
                    Ok(_) => KeyOutcome::Done,
                    Err(e) => self.bell(e),
                };
                // `<C-o>` itself must not settle: the delegated command has
                // not run yet.
                if !delegating {
                    self.finish();
                }
                outcome
            }
            Translation::Invalid(e) => {
                let outcome = self.bell(e);
                self.finish();
                outcome
            }
        }
    }

    pub fn feed_all(&mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Vec<KeyOutcome> {
        keys.into_iter().map(|k| self.feed(k)).collect()
    }

    /// Feed keys written in `<Esc>`/`<C-o>` notation.
    pub fn feed_str(&mut self, keys: &str) -> Result<Vec<KeyOutcome>, KeyParseError> {
        Ok(self.feed_all(parse_keys(keys)?))
    }

    fn bell(&mut self, err: CommandError) -> KeyOutcome {
        debug!(target: "actions.bell", mode = ?self.state.mode(), error = %err, "bell");
        self.state.operator_metrics.incr_bell();
        KeyOutcome::Bell(err)
    }

    fn finish(&mut self) {
        match self.state.mode.settle() {
            Settled::ResumedInsert => self.resume_insert(),
            _ if self.state.mode() == Mode::Insert => self.state.delegated_from = None,
            _ => {}
        }
        if matches!(
            self.state.mode(),
            Mode::Normal | Mode::OperatorPending | Mode::ReplaceOnce
        ) {
            let mut caret = self.state.caret;
            normalize_normal_mode_position(&self.state.buffer, &mut caret);
            self.state.caret = caret;
        }
    }

    /// Back in Insert after a `<C-o>` command. A caret that was past the end
    /// of the line before the command (or that a `$` asked to keep there)
    /// goes back after the last character.
    fn resume_insert(&mut self) {
        let st = &mut self.state;
        let mut caret = st.caret;
        normalize_normal_mode_position(&st.buffer, &mut caret);
        if let Some(from) = st.delegated_from.take() {
            let len = st.buffer.line_len(caret.line);
            let on_last = len > 0 && caret.col == len - 1;
            if on_last && ((from.at_eol && from.line == caret.line) || st.want_col > caret.col) {
                caret.col = len;
            }
        }
        st.set_caret(caret);
        // Entry point, typed text and count carry over; only the undo group
        // is new.
        let session = st
            .insert
            .get_or_insert_with(|| InsertSession::new(caret, 1, InsertKind::Inline));
        if !session.txn_open {
            st.buffer.begin_transaction("insert");
            session.txn_open = true;
        }
        trace!(target: "actions.engine", line = caret.line, col = caret.col, "insert_resumed");
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn caret(&self) -> Position {
        self.state.caret
    }

    /// Host-placed caret; the end-of-line cell is allowed and is pulled
    /// onto a character by the next Normal-mode command.
    pub fn set_caret(&mut self, pos: Position) {
        self.state.move_caret(pos);
    }

    pub fn buffer(&self) -> &B {
        &self.state.buffer
    }

    pub fn registers(&self) -> &Registers {
        &self.state.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.state.registers
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModeObserver>) {
        self.state.mode.add_observer(observer);
    }

    /// Keys typed so far for the pending command.
    pub fn pending_keys(&self) -> String {
        self.translator.showcmd()
    }

    pub fn metrics(&self) -> OperatorMetricsSnapshot {
        self.state.operator_metrics_snapshot()
    }

    pub fn state(&self) -> &EditorState<B> {
        &self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn into_buffer(self) -> B {
        self.state.buffer
    }
}
