use std::fmt::Debug;

use regex::Regex;

use crate::error::BuildError;

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("\\A(?:{pattern})"))
}

/// Matches a fixed set of tagged regular expressions against the start of a
/// string, reporting every tag whose pattern achieves the longest match.
#[derive(Debug, Default)]
pub struct RegexMatcher<H: Copy + Debug> {
    lexemes: Vec<(H, Regex)>,
}

impl<H: Copy + Ord + Debug + ToString> RegexMatcher<H> {
    pub fn new(rules: &[(H, &str)]) -> Result<Self, BuildError> {
        let mut handles: Vec<H> = vec![];
        let mut patterns: Vec<&str> = vec![];
        let mut lexemes = vec![];
        for (handle, pattern) in rules.iter() {
            if pattern.is_empty() {
                return Err(BuildError::EmptyPattern(handle.to_string()));
            }
            if handles.contains(handle) {
                return Err(BuildError::DuplicateHandle(handle.to_string()));
            }
            handles.push(*handle);
            if patterns.contains(pattern) {
                return Err(BuildError::DuplicatePattern((*pattern).to_string()));
            }
            patterns.push(pattern);
            lexemes.push((*handle, anchored(pattern)?));
        }
        Ok(Self { lexemes })
    }

    /// Returns every tag whose rule produced the longest anchored match at the
    /// start of `text`, along with that match's byte length (zero if nothing
    /// matched).
    pub fn longest_matches(&self, text: &str) -> (Vec<H>, usize) {
        let mut matches = vec![];
        let mut largest_end = 0;
        for (handle, regex) in self.lexemes.iter() {
            if let Some(m) = regex.find(text) {
                if m.end() == largest_end {
                    matches.push(*handle);
                } else if m.end() > largest_end {
                    largest_end = m.end();
                    matches = vec![*handle];
                }
            }
        }
        (matches, largest_end)
    }
}

/// Matches any of a set of untagged "skip" regular expressions (whitespace,
/// comments) at the start of a string.
#[derive(Debug, Default)]
pub struct SkipMatcher {
    regexes: Vec<Regex>,
}

impl SkipMatcher {
    pub fn new(patterns: &[&str]) -> Result<Self, BuildError> {
        let mut regexes = vec![];
        for pattern in patterns.iter() {
            if pattern.is_empty() {
                return Err(BuildError::EmptyPattern("<skip>".to_string()));
            }
            regexes.push(anchored(pattern)?);
        }
        Ok(Self { regexes })
    }

    /// Returns the number of bytes at the start of `text` that are consumed
    /// by repeated application of the skip rules.
    pub fn skippable_count(&self, text: &str) -> usize {
        let mut index = 0;
        'outer: while index < text.len() {
            for regex in self.regexes.iter() {
                if let Some(m) = regex.find(&text[index..]) {
                    if m.end() == 0 {
                        continue;
                    }
                    index += m.end();
                    continue 'outer;
                }
            }
            break;
        }
        index
    }
}
