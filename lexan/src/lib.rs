//! A regex-rule-driven tokenizer with explicit start-condition states.
//!
//! A [`LexicalAnalyzer`] is built once from a set of rules (grouped into
//! "start conditions", `INITIAL` being the default) and then drives any
//! number of independent [`TokenStream`]s over input text.

mod error;
mod matcher;

use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

pub use error::{BuildError, Error};
use matcher::{RegexMatcher, SkipMatcher};

/// The initial, always-present start condition.
pub const INITIAL: &str = "INITIAL";

/// A position in the input text: byte offset, 1-based line, 0-based column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    label: Rc<str>,
    offset: usize,
    line: usize,
    column: usize,
}

impl Location {
    fn start(label: &str) -> Self {
        Self {
            label: Rc::from(label),
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Advance past `lexeme`, counting newlines to update line/column.
    fn advance_over(&mut self, lexeme: &str) {
        self.offset += lexeme.len();
        let mut last_newline = None;
        for (i, ch) in lexeme.char_indices() {
            if ch == '\n' {
                self.line += 1;
                last_newline = Some(i + 1);
            }
        }
        if let Some(start) = last_newline {
            self.column = lexeme.len() - start;
        } else {
            self.column += lexeme.chars().count();
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.label, self.line, self.column)
    }
}

/// What a rule's action does with a match: produce one token, produce a
/// sequence of tokens (all but the first queued for later ticks), or skip
/// the matched text entirely (an empty return from the original action
/// convention; see the crate-level note on this in `DESIGN.md`).
#[derive(Debug, Clone)]
pub enum Emission<T> {
    One(T),
    Many(Vec<T>),
    Skip,
}

type ActionFn<T> = Rc<dyn Fn(&str) -> Emission<T>>;

struct ConditionRules<T: Copy + Ord + Debug + std::hash::Hash> {
    matcher: RegexMatcher<T>,
    skip: SkipMatcher,
    actions: HashMap<T, ActionFn<T>>,
}

/// A token pulled from a [`TokenStream`]: its tag, the matched text, and the
/// locations at which it started and ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    tag: T,
    lexeme: String,
    location: Location,
    end_location: Location,
}

impl<T: Copy> Token<T> {
    pub fn tag(&self) -> T {
        self.tag
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The position immediately after the matched lexeme.
    pub fn end_location(&self) -> &Location {
        &self.end_location
    }
}

/// One named bucket of rules plus its end-of-input token.
pub struct ConditionSpec<'a, T> {
    pub name: &'a str,
    pub literal_rules: &'a [(T, &'a str)],
    pub regex_rules: &'a [(T, &'a str)],
    pub skip_rules: &'a [&'a str],
}

pub struct LexicalAnalyzer<T: Copy + Ord + Debug + Display + std::hash::Hash> {
    conditions: HashMap<String, ConditionRules<T>>,
    end_token: T,
    case_insensitive: bool,
}

impl<T: Copy + Ord + Debug + Display + std::hash::Hash + 'static> LexicalAnalyzer<T> {
    /// Build a single-condition (`INITIAL`) analyzer: `literal_rules` are
    /// matched as exact (regex-escaped) text, `regex_rules` as regular
    /// expressions; both emit their tag verbatim. `skip_rules` are tried
    /// whenever no token rule can win and simply advance the cursor.
    pub fn new(
        literal_rules: &[(T, &str)],
        regex_rules: &[(T, &str)],
        skip_rules: &[&str],
        end_token: T,
    ) -> Result<Self, BuildError> {
        Self::with_conditions(
            &[ConditionSpec {
                name: INITIAL,
                literal_rules,
                regex_rules,
                skip_rules,
            }],
            end_token,
        )
    }

    pub fn with_conditions(
        specs: &[ConditionSpec<T>],
        end_token: T,
    ) -> Result<Self, BuildError> {
        let mut conditions = HashMap::new();
        for spec in specs {
            let mut rules: Vec<(T, String)> = vec![];
            for (tag, text) in spec.literal_rules {
                rules.push((*tag, regex::escape(text)));
            }
            for (tag, pattern) in spec.regex_rules {
                rules.push((*tag, (*pattern).to_string()));
            }
            let borrowed: Vec<(T, &str)> = rules.iter().map(|(t, p)| (*t, p.as_str())).collect();
            let matcher = RegexMatcher::new(&borrowed)?;
            let skip = SkipMatcher::new(spec.skip_rules)?;
            conditions.insert(
                spec.name.to_string(),
                ConditionRules {
                    matcher,
                    skip,
                    actions: HashMap::new(),
                },
            );
        }
        Ok(Self {
            conditions,
            end_token,
            case_insensitive: false,
        })
    }

    /// Install a non-default action for `tag` within `condition`, overriding
    /// the plain "emit this tag" behaviour (e.g. to skip, or to queue a
    /// sequence of tokens for one match).
    pub fn set_action(
        &mut self,
        condition: &str,
        tag: T,
        action: impl Fn(&str) -> Emission<T> + 'static,
    ) {
        if let Some(rules) = self.conditions.get_mut(condition) {
            rules.actions.insert(tag, Rc::new(action));
        }
    }

    pub fn set_case_insensitive(&mut self, flag: bool) {
        self.case_insensitive = flag;
    }

    pub fn token_stream<'a>(&'a self, text: String, label: &str) -> TokenStream<'a, T> {
        TokenStream {
            analyzer: self,
            text,
            cursor: 0,
            location: Location::start(label),
            condition_stack: vec![INITIAL.to_string()],
            pending: VecDeque::new(),
            end_emitted: false,
        }
    }
}

/// The live state of one tokenization pass: cursor, location, the stack of
/// active start conditions, and tokens queued by multi-emission rules.
pub struct TokenStream<'a, T: Copy + Ord + Debug + Display + std::hash::Hash> {
    analyzer: &'a LexicalAnalyzer<T>,
    text: String,
    cursor: usize,
    location: Location,
    condition_stack: Vec<String>,
    pending: VecDeque<Token<T>>,
    end_emitted: bool,
}

impl<'a, T: Copy + Ord + Debug + Display + std::hash::Hash + 'static> TokenStream<'a, T> {
    pub fn push_condition(&mut self, name: &str) {
        self.condition_stack.push(name.to_string());
    }

    pub fn pop_condition(&mut self) {
        if self.condition_stack.len() > 1 {
            self.condition_stack.pop();
        }
    }

    pub fn current_condition(&self) -> &str {
        self.condition_stack.last().expect("INITIAL never popped")
    }

    /// Prepend `text` to the unconsumed input so it is the next thing
    /// tokenized; used by semantic actions that need to push generated
    /// source back through the lexer.
    pub fn inject(&mut self, text: String, _label: String) {
        self.text.replace_range(..self.cursor, "");
        self.cursor = 0;
        self.text.insert_str(0, &text);
    }

    fn remaining(&self) -> &str {
        &self.text[self.cursor..]
    }

    fn rules(&self) -> &ConditionRules<T> {
        self.analyzer
            .conditions
            .get(self.current_condition())
            .expect("condition was pushed without matching rules")
    }

    fn consume(&mut self, lexeme: &str) -> Location {
        let start = self.location.clone();
        self.cursor += lexeme.len();
        self.location.advance_over(lexeme);
        start
    }

    /// Advance past skippable text and return whatever remains, or `None`
    /// once input is exhausted.
    fn skip_to_next_token(&mut self) -> bool {
        loop {
            let skipped = self.rules().skip.skippable_count(self.remaining());
            if skipped == 0 {
                return !self.remaining().is_empty();
            }
            let text = self.remaining()[..skipped].to_string();
            self.consume(&text);
            if self.remaining().is_empty() {
                return false;
            }
        }
    }

    /// Peek at (but do not consume) the next token.
    pub fn front(&mut self) -> Result<Token<T>, Error<T>> {
        loop {
            if let Some(token) = self.pending.front() {
                return Ok(token.clone());
            }
            if !self.skip_to_next_token() {
                if self.end_emitted {
                    return Ok(Token {
                        tag: self.analyzer.end_token,
                        lexeme: String::new(),
                        location: self.location.clone(),
                        end_location: self.location.clone(),
                    });
                }
                self.pending.push_back(Token {
                    tag: self.analyzer.end_token,
                    lexeme: String::new(),
                    location: self.location.clone(),
                    end_location: self.location.clone(),
                });
                continue;
            }
            let (matches, len) = self.rules().matcher.longest_matches(self.remaining());
            if len == 0 {
                let text = self.remaining().chars().take(16).collect();
                return Err(Error::UnexpectedText {
                    text,
                    location: self.location.clone(),
                });
            }
            if matches.len() > 1 {
                let text = self.remaining()[..len].to_string();
                return Err(Error::AmbiguousMatches {
                    tags: matches,
                    text,
                    location: self.location.clone(),
                });
            }
            let tag = matches[0];
            let lexeme = self.remaining()[..len].to_string();
            let action = self.rules().actions.get(&tag).cloned();
            let start_location = self.consume(&lexeme);
            let end_location = self.location.clone();
            let emission = if let Some(action) = action {
                action(&lexeme)
            } else {
                Emission::One(tag)
            };
            match emission {
                Emission::Skip => continue,
                Emission::One(tag) => {
                    self.pending.push_back(Token {
                        tag,
                        lexeme,
                        location: start_location,
                        end_location,
                    });
                }
                Emission::Many(tags) => {
                    for tag in tags {
                        self.pending.push_back(Token {
                            tag,
                            lexeme: lexeme.clone(),
                            location: start_location.clone(),
                            end_location: end_location.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Consume the token previously returned by `front`.
    pub fn advance(&mut self) {
        if let Some(token) = self.pending.pop_front() {
            if token.tag == self.analyzer.end_token {
                self.end_emitted = true;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_emitted && self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Tag {
        Id,
        End,
    }

    impl Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn init_logging() {
        let _ = env_logger::try_init();
    }

    #[test]
    fn tracks_line_and_column_across_newlines() {
        init_logging();
        let lexan = LexicalAnalyzer::new(&[], &[(Tag::Id, "[a-z]+")], &[r"\s+"], Tag::End).unwrap();
        let mut stream = lexan.token_stream("ab\ncd".to_string(), "test");
        let first = stream.front().unwrap();
        assert_eq!(first.tag(), Tag::Id);
        assert_eq!(first.lexeme(), "ab");
        assert_eq!(first.location().line(), 1);
        assert_eq!(first.location().column(), 0);
        assert_eq!(first.end_location().line(), 1);
        assert_eq!(first.end_location().column(), 2);
        stream.advance();
        let second = stream.front().unwrap();
        assert_eq!(second.lexeme(), "cd");
        assert_eq!(second.location().line(), 2);
        assert_eq!(second.location().column(), 0);
        assert_eq!(second.end_location().line(), 2);
        assert_eq!(second.end_location().column(), 2);
    }

    #[test]
    fn unmatched_input_is_an_error() {
        init_logging();
        let lexan = LexicalAnalyzer::new(&[], &[(Tag::Id, "[a-z]+")], &[r"\s+"], Tag::End).unwrap();
        let mut stream = lexan.token_stream("12".to_string(), "test");
        assert!(matches!(stream.front(), Err(Error::UnexpectedText { .. })));
    }

    #[test]
    fn emits_single_end_token_at_eoi() {
        init_logging();
        let lexan = LexicalAnalyzer::new(&[], &[(Tag::Id, "[a-z]+")], &[r"\s+"], Tag::End).unwrap();
        let mut stream = lexan.token_stream("a".to_string(), "test");
        stream.advance(); // id
        let end = stream.front().unwrap();
        assert_eq!(end.tag(), Tag::End);
        stream.advance();
        assert!(stream.is_empty());
        let end_again = stream.front().unwrap();
        assert_eq!(end_again.tag(), Tag::End);
    }
}
