//! A small framework for hand-written, context-sensitive lexers.
//!
//! A lexer is a state machine. Each [`State`] is a function that inspects
//! the input through the acceptor methods of [`Lexer`], emits zero or more
//! tokens, and returns the next state (or `None` to stop). No regular
//! expressions are involved, which keeps rules like "a single space is part
//! of the name but two spaces end it" easy to express.
//!
//! # Architecture
//!
//! ```text
//! LexerDefinition::lex_string() ──spawn──► worker thread runs the states
//!                                              │ emit()
//!                                              ▼
//!                                   bounded(1) channel of Token
//!                                              │
//!                   TokenStream::next_token() ◄┘ (blocks)
//! ```
//!
//! The worker finishes with an EOF token, or with an Error token carrying
//! the message when a state returns an error. Dropping the [`TokenStream`]
//! stops the worker at its next `emit`.
//!
//! # Example
//!
//! ```
//! use hledger_parser::lexer::{Lexer, LexerDefinition, State, StateResult};
//!
//! fn words(l: &mut Lexer<'_>) -> StateResult {
//!     if l.accept_eof().is_some() {
//!         return Ok(None);
//!     }
//!     if l.accept_run(" ").is_some() {
//!         l.emit(l.symbol("Space"));
//!     } else {
//!         l.accept_until(" ");
//!         l.emit(l.symbol("Word"));
//!     }
//!     Ok(Some(State(words)))
//! }
//!
//! let definition = LexerDefinition::new(State(words), &["Word", "Space"]);
//! let values: Vec<String> = definition
//!     .lex_string("inline", "hello  world")
//!     .map(|token| token.unwrap().value)
//!     .collect();
//! assert_eq!(values, ["hello", "  ", "world"]);
//! ```

use crossbeam_channel::{Receiver, Sender};
use hledger_core::Position;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Result of running one state function.
pub type StateResult = Result<Option<State>, LexError>;

/// A lexer state: a function from the lexer to the next state.
#[derive(Clone, Copy)]
pub struct State(pub fn(&mut Lexer<'_>) -> StateResult);

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("State(..)")
    }
}

/// Errors raised while lexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Input ended while more was required.
    #[error("{pos}: unexpected end of input")]
    UnexpectedEof {
        /// Where the input ended.
        pos: Position,
    },
    /// Any other lexical error.
    #[error("{pos}: {message}")]
    Custom {
        /// Where the error was detected.
        pos: Position,
        /// Human-readable description.
        message: String,
    },
}

impl LexError {
    /// Where the error occurred.
    #[must_use]
    pub const fn pos(&self) -> &Position {
        match self {
            Self::UnexpectedEof { pos } | Self::Custom { pos, .. } => pos,
        }
    }

    /// The message without the position prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnexpectedEof { .. } => "unexpected end of input".to_string(),
            Self::Custom { message, .. } => message.clone(),
        }
    }
}

/// A saved lexer position that can be restored with [`Lexer::restore`].
///
/// Restoring only rewinds the read position; the start of the pending
/// token is left alone.
#[derive(Debug, Clone)]
pub struct Backup(Position);

impl Backup {
    /// The saved position.
    #[must_use]
    pub const fn pos(&self) -> &Position {
        &self.0
    }
}

struct Definition {
    initial: State,
    kinds: Vec<TokenKind>,
}

/// A lexer definition: the initial state and the token kinds it may emit.
///
/// Cheap to clone; clones share the same definition.
#[derive(Clone)]
pub struct LexerDefinition {
    inner: Arc<Definition>,
}

impl LexerDefinition {
    /// Create a definition starting in `initial`.
    ///
    /// Kinds are numbered in the order of `symbol_names`, starting at
    /// [`TokenKind::FIRST_USER_ID`].
    ///
    /// # Panics
    ///
    /// Panics if a name is repeated or clashes with a reserved kind.
    #[must_use]
    pub fn new(initial: State, symbol_names: &[&'static str]) -> Self {
        let mut kinds = vec![TokenKind::ERROR, TokenKind::EOF, TokenKind::PLACEHOLDER];
        for (id, name) in (TokenKind::FIRST_USER_ID..).zip(symbol_names) {
            assert!(
                kinds.iter().all(|kind| kind.name() != *name),
                "duplicate token kind {name:?}"
            );
            kinds.push(TokenKind::new(id, name));
        }

        Self {
            inner: Arc::new(Definition { initial, kinds }),
        }
    }

    /// Look up a token kind by name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not part of this definition.
    #[must_use]
    pub fn symbol(&self, name: &str) -> TokenKind {
        lookup(&self.inner.kinds, name)
    }

    /// All token kinds, reserved ones first.
    #[must_use]
    pub fn symbols(&self) -> &[TokenKind] {
        &self.inner.kinds
    }

    /// Start lexing `input` on a worker thread.
    pub fn lex_string(
        &self,
        filename: impl Into<Arc<str>>,
        input: impl Into<Arc<str>>,
    ) -> TokenStream {
        let filename: Arc<str> = filename.into();
        let input: Arc<str> = input.into();
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let definition = Arc::clone(&self.inner);
        let worker_filename = Arc::clone(&filename);

        std::thread::spawn(move || {
            let mut lexer = Lexer::new(&input, worker_filename, &definition.kinds, sender);
            lexer.run(definition.initial);
        });

        TokenStream {
            receiver,
            filename,
            finished: None,
            done: false,
        }
    }

    /// Read all of `reader`, then start lexing it.
    ///
    /// # Errors
    ///
    /// Fails if reading fails or the input is not UTF-8.
    pub fn lex_reader(
        &self,
        filename: impl Into<Arc<str>>,
        mut reader: impl Read,
    ) -> io::Result<TokenStream> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let input =
            String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(self.lex_string(filename, input))
    }
}

impl fmt::Debug for LexerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexerDefinition")
            .field("kinds", &self.inner.kinds)
            .finish_non_exhaustive()
    }
}

fn lookup(kinds: &[TokenKind], name: &str) -> TokenKind {
    match kinds.iter().find(|kind| kind.name() == name) {
        Some(kind) => *kind,
        None => panic!("unknown token kind {name:?}"),
    }
}

/// The receiving end of a lex run.
pub struct TokenStream {
    receiver: Receiver<Token>,
    filename: Arc<str>,
    finished: Option<Result<Token, LexError>>,
    done: bool,
}

impl TokenStream {
    /// Wait for the next token.
    ///
    /// Returns the EOF token once the input is exhausted, and keeps
    /// returning it on further calls. An Error token from the lexer is
    /// turned into `Err`, which is likewise repeated.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(finished) = &self.finished {
            return finished.clone();
        }

        let result = match self.receiver.recv() {
            Ok(token) if token.kind == TokenKind::ERROR => Err(LexError::Custom {
                pos: token.pos,
                message: token.value,
            }),
            Ok(token) if token.is_eof() => Ok(token),
            Ok(token) => return Ok(token),
            Err(_) => Err(LexError::Custom {
                pos: Position::start(Arc::clone(&self.filename)),
                message: "lexer stopped before the end of input".to_string(),
            }),
        };

        self.finished = Some(result.clone());
        result
    }

    /// The file being lexed.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl Iterator for TokenStream {
    type Item = Result<Token, LexError>;

    /// Yields every token up to (not including) EOF; an error is yielded
    /// once and ends the iteration.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.is_eof() => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("filename", &self.filename)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// The lexer state handed to state functions.
///
/// `start` marks the beginning of the pending token, `pos` the read head.
/// [`Lexer::emit`] turns `start..pos` into a token.
pub struct Lexer<'a> {
    input: &'a str,
    kinds: &'a [TokenKind],
    start: Position,
    pos: Position,
    sink: Sender<Token>,
    closed: bool,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(
        input: &'a str,
        filename: Arc<str>,
        kinds: &'a [TokenKind],
        sink: Sender<Token>,
    ) -> Self {
        let start = Position::start(filename);
        Self {
            input,
            kinds,
            pos: start.clone(),
            start,
            sink,
            closed: false,
        }
    }

    fn run(&mut self, initial: State) {
        let mut state = Some(initial);
        while let Some(State(step)) = state {
            if self.closed {
                return;
            }
            match step(self) {
                Ok(next) => state = next,
                Err(err) => {
                    let message = err.message();
                    self.send(Token::new(TokenKind::ERROR, message, err.pos().clone()));
                    return;
                }
            }
        }
        let eof = Token::new(TokenKind::EOF, "", self.pos.clone());
        self.send(eof);
    }

    fn send(&mut self, token: Token) {
        if self.sink.send(token).is_err() {
            self.closed = true;
        }
    }

    /// Look up a token kind of the running definition by name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is unknown.
    #[must_use]
    pub fn symbol(&self, name: &str) -> TokenKind {
        lookup(self.kinds, name)
    }

    /// The read position.
    #[must_use]
    pub const fn pos(&self) -> &Position {
        &self.pos
    }

    /// The start of the pending token.
    #[must_use]
    pub const fn start(&self) -> &Position {
        &self.start
    }

    /// The text of the pending token.
    #[must_use]
    pub fn pending(&self) -> &'a str {
        &self.input[self.start.offset..self.pos.offset]
    }

    /// The unread input.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    /// Save the read position.
    #[must_use]
    pub fn save(&self) -> Backup {
        Backup(self.pos.clone())
    }

    /// Rewind the read position to `backup`.
    pub fn restore(&mut self, backup: Backup) {
        debug_assert!(backup.0.offset >= self.start.offset, "backup before token start");
        self.pos = backup.0;
    }

    /// Consume one character.
    ///
    /// Returns `None` at end of input, in which case nothing moves and the
    /// backup is a no-op.
    pub fn next_rune(&mut self) -> (Option<char>, Backup) {
        let backup = self.save();
        let ch = self.rest().chars().next();
        if let Some(ch) = ch {
            self.pos.step(ch);
        }
        (ch, backup)
    }

    /// Look at the next character without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Emit the pending text as a token of `kind` and start a new token.
    pub fn emit(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.pending(), self.start.clone());
        self.send(token);
        self.start = self.pos.clone();
    }

    /// Drop the pending text and start a new token.
    pub fn ignore(&mut self) {
        self.start = self.pos.clone();
    }

    /// Consume the next character if it is one of `valid`.
    ///
    /// Returns the backup to undo the consumption, or `None` if nothing
    /// was consumed.
    ///
    /// # Errors
    ///
    /// [`LexError::UnexpectedEof`] at end of input.
    pub fn accept(&mut self, valid: &str) -> Result<Option<Backup>, LexError> {
        self.accept_fn(|ch| valid.contains(ch))
    }

    /// Consume the next character if it satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// [`LexError::UnexpectedEof`] at end of input.
    pub fn accept_fn(
        &mut self,
        predicate: impl Fn(char) -> bool,
    ) -> Result<Option<Backup>, LexError> {
        match self.next_rune() {
            (None, _) => Err(LexError::UnexpectedEof {
                pos: self.pos.clone(),
            }),
            (Some(ch), backup) if predicate(ch) => Ok(Some(backup)),
            (Some(_), backup) => {
                self.restore(backup);
                Ok(None)
            }
        }
    }

    /// Consume a run of characters from `valid`.
    ///
    /// End of input simply ends the run. Returns a backup to the position
    /// before the run if anything was consumed.
    pub fn accept_run(&mut self, valid: &str) -> Option<Backup> {
        self.accept_run_fn(|ch| valid.contains(ch))
    }

    /// Consume a run of characters satisfying `predicate`.
    pub fn accept_run_fn(&mut self, predicate: impl Fn(char) -> bool) -> Option<Backup> {
        let backup = self.save();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.pos.step(ch);
        }
        (self.pos.offset > backup.0.offset).then_some(backup)
    }

    /// Consume `literal` entirely, or nothing at all.
    ///
    /// # Errors
    ///
    /// [`LexError::UnexpectedEof`] if the input ends inside a matching
    /// prefix of `literal`. The position is restored in that case too.
    pub fn accept_string(&mut self, literal: &str) -> Result<bool, LexError> {
        let backup = self.save();
        for expected in literal.chars() {
            match self.next_rune().0 {
                Some(ch) if ch == expected => {}
                Some(_) => {
                    self.restore(backup);
                    return Ok(false);
                }
                None => {
                    let pos = self.pos.clone();
                    self.restore(backup);
                    return Err(LexError::UnexpectedEof { pos });
                }
            }
        }
        Ok(true)
    }

    /// Consume up to, not including, any of `terminators` or end of input.
    ///
    /// Returns whether anything was consumed.
    pub fn accept_until(&mut self, terminators: &str) -> bool {
        self.accept_run_fn(|ch| !terminators.contains(ch)).is_some()
    }

    /// Succeed at end of input. Consuming the end moves nothing, so the
    /// backup is a no-op.
    pub fn accept_eof(&mut self) -> Option<Backup> {
        self.peek().is_none().then(|| self.save())
    }

    /// Check whether the read position is the start of the input.
    #[must_use]
    pub const fn assert_at_start(&self) -> bool {
        self.pos.offset == 0
    }

    /// Check whether the character right before the read position is one
    /// of `valid`. Always false at the start of the input.
    #[must_use]
    pub fn assert_after(&self, valid: &str) -> bool {
        self.input[..self.pos.offset]
            .chars()
            .next_back()
            .is_some_and(|ch| valid.contains(ch))
    }

    /// Build an error at the read position.
    #[must_use]
    pub fn errorf(&self, args: fmt::Arguments<'_>) -> LexError {
        LexError::Custom {
            pos: self.pos.clone(),
            message: args.to_string(),
        }
    }

    /// Build an error at the read position from another error.
    #[must_use]
    pub fn error(&self, err: impl fmt::Display) -> LexError {
        self.errorf(format_args!("{err}"))
    }
}
