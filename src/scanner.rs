//! Tokenizes a decoded character stream into the lexical [`Token`] model.
//!
//! The scanner cannot emit tokens strictly left to right: whether a scalar
//! is a mapping key is only known once a `:` is seen, possibly several
//! tokens later, so candidate keys are tracked in [`simple_keys`] and a
//! `KEY` token is spliced into the already-queued [`tokens`] once
//! confirmed.
//!
//! [`simple_keys`]: Scanner::simple_keys
//! [`tokens`]: Scanner::tokens

use std::collections::VecDeque;
use std::io::Read;

use crate::macros::{
    is_alpha, is_blank, is_blankz, is_bom, is_break, is_breakz, is_digit, is_hex, is_space, is_tab,
};
use crate::reader::Reader;
use crate::token::{Token, TokenData};
use crate::{Encoding, Mark, ScalarStyle, ScannerError, MAX_SIMPLE_KEY_LENGTH};

#[derive(Clone, Copy, Default)]
struct PossibleSimpleKey {
    possible: bool,
    required: bool,
    token_number: u64,
    mark: Mark,
}

/// Turns a decoded character stream into a lazy stream of [`Token`]s.
///
/// `Scanner::scan` pulls exactly as many tokens as needed to resolve every
/// simple key that might still apply to the token about to be returned,
/// including ones not yet dequeued.
#[non_exhaustive]
pub struct Scanner<'r> {
    reader: Reader<'r>,
    pub(crate) tokens: VecDeque<Token>,
    pub(crate) tokens_parsed: u64,
    pub(crate) token_available: bool,
    stream_start_produced: bool,
    pub(crate) stream_end_produced: bool,
    /// The column at which the innermost open block collection starts, or
    /// -1 before any block collection has been opened.
    indent: i64,
    indents: Vec<i64>,
    /// Count of unclosed `[`/`{`. Indentation is ignored whenever nonzero.
    flow_level: u32,
    simple_key_allowed: bool,
    simple_keys: Vec<PossibleSimpleKey>,
}

impl<'r> Default for Scanner<'r> {
    fn default() -> Self {
        Self::new()
    }
}

const MAX_VERSION_NUMBER_LENGTH: u64 = 9;

impl<'r> Scanner<'r> {
    /// Create a scanner with no input source yet attached.
    pub fn new() -> Self {
        Scanner {
            reader: Reader::new(),
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            token_available: false,
            stream_start_produced: false,
            stream_end_produced: false,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            simple_key_allowed: false,
            simple_keys: Vec::new(),
        }
    }

    /// Attach an in-memory byte slice as the input source.
    pub fn set_input_string(&mut self, input: &'r [u8]) {
        self.reader.set_input_string(input);
    }

    /// Attach a generic reader as the input source.
    pub fn set_input(&mut self, input: &'r mut dyn Read) {
        self.reader.set_input(input);
    }

    /// Fix the encoding up front, bypassing BOM sniffing.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.reader.set_encoding(encoding);
    }

    /// Scan and return the next token.
    ///
    /// The first token is always `STREAM-START`; once `STREAM-END` has been
    /// produced, every subsequent call returns a fresh `STREAM-END` token
    /// rather than erroring.
    pub fn scan(&mut self) -> Result<Token, ScannerError> {
        if self.stream_end_produced {
            let mark = self.mark();
            return Ok(Token {
                data: TokenData::StreamEnd,
                start_mark: mark,
                end_mark: mark,
            });
        }
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        let token = self
            .tokens
            .pop_front()
            .expect("token_available is true, but token queue is empty");
        self.token_available = false;
        self.tokens_parsed += 1;
        if matches!(token.data, TokenData::StreamEnd) {
            self.stream_end_produced = true;
        }
        Ok(token)
    }

    pub(crate) fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        loop {
            let mut need_more_tokens = self.tokens.is_empty();
            if !need_more_tokens {
                self.stale_simple_keys()?;
                for key in &self.simple_keys {
                    if key.possible && key.token_number == self.tokens_parsed {
                        need_more_tokens = true;
                        break;
                    }
                }
            }
            if !need_more_tokens {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    // --- small helpers standing in for the C source's buffer-inspection macros ---

    fn mark(&self) -> Mark {
        self.reader.mark()
    }

    fn cache(&mut self, length: usize) -> Result<(), ScannerError> {
        Ok(self.reader.ensure(length)?)
    }

    fn peek(&self, at: usize) -> Option<char> {
        self.reader.buffer.get(at).copied()
    }

    fn check(&self, ch: char) -> bool {
        self.peek(0) == Some(ch)
    }

    fn check_at(&self, ch: char, at: usize) -> bool {
        self.peek(at) == Some(ch)
    }

    fn is_z(&self) -> bool {
        self.peek(0).is_none()
    }

    fn is_blank(&self) -> bool {
        is_blank(self.peek(0))
    }

    fn is_blankz(&self) -> bool {
        is_blankz(self.peek(0))
    }

    fn is_blankz_at(&self, at: usize) -> bool {
        is_blankz(self.peek(at))
    }

    fn is_blank_at(&self, at: usize) -> bool {
        is_blank(self.peek(at))
    }

    fn is_break(&self) -> bool {
        is_break(self.peek(0))
    }

    fn is_break_at(&self, at: usize) -> bool {
        is_break(self.peek(at))
    }

    fn is_breakz(&self) -> bool {
        is_breakz(self.peek(0))
    }

    fn is_alpha(&self) -> bool {
        is_alpha(self.peek(0))
    }

    fn is_digit(&self) -> bool {
        is_digit(self.peek(0))
    }

    fn as_digit(&self) -> u32 {
        self.peek(0).and_then(|ch| ch.to_digit(10)).unwrap()
    }

    fn is_hex_at(&self, at: usize) -> bool {
        is_hex(self.peek(at))
    }

    fn as_hex_at(&self, at: usize) -> u32 {
        self.peek(at).and_then(|ch| ch.to_digit(16)).unwrap()
    }

    fn is_tab(&self) -> bool {
        is_tab(self.peek(0))
    }

    fn is_space(&self) -> bool {
        is_space(self.peek(0))
    }

    fn is_bom(&self) -> bool {
        self.peek(0).is_some_and(is_bom)
    }

    fn skip(&mut self) {
        self.reader.advance();
    }

    fn skip_line(&mut self) {
        if self.is_break() {
            self.reader.advance_line();
        }
    }

    fn read_string(&mut self, string: &mut String) {
        string.push(self.reader.advance());
    }

    fn read_line_string(&mut self, string: &mut String) {
        string.push(self.reader.advance_line());
    }

    fn error<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, ScannerError> {
        Err(ScannerError::Problem {
            context,
            context_mark,
            problem,
            problem_mark: self.mark(),
        })
    }

    fn error_at<T>(&self, problem: &'static str) -> Result<T, ScannerError> {
        Err(ScannerError::ProblemAt {
            problem,
            problem_mark: self.mark(),
        })
    }

    // --- bookkeeping shared by every fetch_* routine ---

    fn stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        let current = self.mark();
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < current.line
                    || key.mark.index + MAX_SIMPLE_KEY_LENGTH as u64 < current.index)
            {
                if key.required {
                    return Err(ScannerError::Problem {
                        context: "while scanning a simple key",
                        context_mark: key.mark,
                        problem: "could not find expected ':'",
                        problem_mark: current,
                    });
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), ScannerError> {
        let required = self.flow_level == 0 && self.indent == self.mark().column as i64;
        if self.simple_key_allowed {
            let token_number = self.tokens_parsed + self.tokens.len() as u64;
            let mark = self.mark();
            self.remove_simple_key()?;
            *self.simple_keys.last_mut().unwrap() = PossibleSimpleKey {
                possible: true,
                required,
                token_number,
                mark,
            };
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let current = self.mark();
        let key = self
            .simple_keys
            .last_mut()
            .expect("simple key stack must never be empty while scanning");
        if key.possible && key.required {
            return Err(ScannerError::Problem {
                context: "while scanning a simple key",
                context_mark: key.mark,
                problem: "could not find expected ':'",
                problem_mark: current,
            });
        }
        key.possible = false;
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(PossibleSimpleKey::default());
        assert!(self.flow_level < u32::MAX, "flow level overflow");
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level != 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Open a block collection if `column` is a deeper indent than the
    /// current one, inserting its virtual opener at queue position `number`
    /// (or at the tail, if `None`).
    fn roll_indent(&mut self, column: i64, number: Option<u64>, data: TokenData, mark: Mark) {
        if self.flow_level != 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token {
                data,
                start_mark: mark,
                end_mark: mark,
            };
            match number {
                None => self.tokens.push_back(token),
                Some(number) => {
                    let index = (number - self.tokens_parsed) as usize;
                    self.tokens.insert(index, token);
                }
            }
        }
    }

    /// Close every block collection whose indent exceeds `column`, using
    /// `mark` as the position of the synthesized `BLOCK-END` tokens.
    fn unroll_indent(&mut self, column: i64, mark: Mark) {
        if self.flow_level != 0 {
            return;
        }
        while self.indent > column {
            self.tokens.push_back(Token {
                data: TokenData::BlockEnd,
                start_mark: mark,
                end_mark: mark,
            });
            self.indent = self.indents.pop().unwrap();
        }
    }

    // --- dispatch ---

    fn fetch_next_token(&mut self) -> Result<(), ScannerError> {
        self.cache(1)?;
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        let column = self.mark().column as i64;
        let mark = self.mark();
        self.unroll_indent(column, mark);
        self.cache(4)?;

        if self.is_z() {
            return self.fetch_stream_end();
        }
        if self.mark().column == 0 && self.check('%') {
            return self.fetch_directive();
        }
        if self.mark().column == 0
            && self.check_at('-', 0)
            && self.check_at('-', 1)
            && self.check_at('-', 2)
            && self.is_blankz_at(3)
        {
            return self.fetch_document_indicator(TokenData::DocumentStart);
        }
        if self.mark().column == 0
            && self.check_at('.', 0)
            && self.check_at('.', 1)
            && self.check_at('.', 2)
            && self.is_blankz_at(3)
        {
            return self.fetch_document_indicator(TokenData::DocumentEnd);
        }
        if self.check('[') {
            return self.fetch_flow_collection_start(TokenData::FlowSequenceStart);
        }
        if self.check('{') {
            return self.fetch_flow_collection_start(TokenData::FlowMappingStart);
        }
        if self.check(']') {
            return self.fetch_flow_collection_end(TokenData::FlowSequenceEnd);
        }
        if self.check('}') {
            return self.fetch_flow_collection_end(TokenData::FlowMappingEnd);
        }
        if self.check(',') {
            return self.fetch_flow_entry();
        }
        if self.check('-') && self.is_blankz_at(1) {
            return self.fetch_block_entry();
        }
        if self.check('?') && (self.flow_level != 0 || self.is_blankz_at(1)) {
            return self.fetch_key();
        }
        if self.check(':') && (self.flow_level != 0 || self.is_blankz_at(1)) {
            return self.fetch_value();
        }
        if self.check('*') {
            return self.fetch_anchor(true);
        }
        if self.check('&') {
            return self.fetch_anchor(false);
        }
        if self.check('!') {
            return self.fetch_tag();
        }
        if self.check('|') && self.flow_level == 0 {
            return self.fetch_block_scalar(true);
        }
        if self.check('>') && self.flow_level == 0 {
            return self.fetch_block_scalar(false);
        }
        if self.check('\'') {
            return self.fetch_flow_scalar(true);
        }
        if self.check('"') {
            return self.fetch_flow_scalar(false);
        }
        if !(self.is_blankz()
            || self.check('-')
            || self.check('?')
            || self.check(':')
            || self.check(',')
            || self.check('[')
            || self.check(']')
            || self.check('{')
            || self.check('}')
            || self.check('#')
            || self.check('&')
            || self.check('*')
            || self.check('!')
            || self.check('|')
            || self.check('>')
            || self.check('\'')
            || self.check('"')
            || self.check('%')
            || self.check('@')
            || self.check('`'))
            || self.check('-') && !self.is_blank_at(1)
            || self.flow_level == 0
                && (self.check('?') || self.check(':'))
                && !self.is_blankz_at(1)
        {
            return self.fetch_plain_scalar();
        }
        self.error(
            "while scanning for the next token",
            self.mark(),
            "found character that cannot start any token",
        )
    }

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(PossibleSimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::StreamStart {
                encoding: self.reader.encoding(),
            },
            start_mark: mark,
            end_mark: mark,
        });
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScannerError> {
        let mut mark = self.mark();
        if mark.column != 0 {
            mark.column = 0;
            mark.line += 1;
        }
        self.unroll_indent(-1, mark);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.tokens.push_back(Token {
            data: TokenData::StreamEnd,
            start_mark: mark,
            end_mark: mark,
        });
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        let mark = self.mark();
        self.unroll_indent(-1, mark);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), ScannerError> {
        let mark = self.mark();
        self.unroll_indent(-1, mark);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark();
        self.skip();
        self.skip();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::FlowEntry,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error_at("block sequence entries are not allowed in this context");
            }
            let column = self.mark().column as i64;
            let mark = self.mark();
            self.roll_indent(column, None, TokenData::BlockSequenceStart, mark);
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::BlockEntry,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error_at("mapping keys are not allowed in this context");
            }
            let column = self.mark().column as i64;
            let mark = self.mark();
            self.roll_indent(column, None, TokenData::BlockMappingStart, mark);
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Key,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let key = *self.simple_keys.last().unwrap();
        if key.possible {
            let index = (key.token_number - self.tokens_parsed) as usize;
            self.tokens.insert(
                index,
                Token {
                    data: TokenData::Key,
                    start_mark: key.mark,
                    end_mark: key.mark,
                },
            );
            self.roll_indent(
                key.mark.column as i64,
                Some(key.token_number),
                TokenData::BlockMappingStart,
                key.mark,
            );
            self.simple_keys.last_mut().unwrap().possible = false;
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return self.error_at("mapping values are not allowed in this context");
                }
                let column = self.mark().column as i64;
                let mark = self.mark();
                self.roll_indent(column, None, TokenData::BlockMappingStart, mark);
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark();
        self.skip();
        let end_mark = self.mark();
        self.tokens.push_back(Token {
            data: TokenData::Value,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    // --- whitespace & comments between tokens ---

    fn scan_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            self.cache(1)?;
            if self.mark().column == 0 && self.is_bom() {
                self.skip();
            }
            self.cache(1)?;
            while self.check(' ')
                || (self.flow_level != 0 || !self.simple_key_allowed) && self.check('\t')
            {
                self.skip();
                self.cache(1)?;
            }
            if self.check('#') {
                while !self.is_breakz() {
                    self.skip();
                    self.cache(1)?;
                }
            }
            if !self.is_break() {
                break;
            }
            self.cache(2)?;
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
        Ok(())
    }

    // --- directives ---

    fn scan_directive(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark();
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let data = if name == "YAML" {
            let (major, minor) = self.scan_version_directive_value(start_mark)?;
            TokenData::VersionDirective { major, minor }
        } else if name == "TAG" {
            let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
            TokenData::TagDirective { handle, prefix }
        } else {
            return self.error(
                "while scanning a directive",
                start_mark,
                "found unknown directive name",
            );
        };

        self.cache(1)?;
        while self.is_blank() {
            self.skip();
            self.cache(1)?;
        }
        if self.check('#') {
            while !self.is_breakz() {
                self.skip();
                self.cache(1)?;
            }
        }
        if !self.is_breakz() {
            return self.error(
                "while scanning a directive",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if self.is_break() {
            self.cache(2)?;
            self.skip_line();
        }
        let end_mark = self.mark();
        Ok(Token {
            data,
            start_mark,
            end_mark,
        })
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, ScannerError> {
        let mut string = String::new();
        self.cache(1)?;
        while self.is_alpha() {
            self.read_string(&mut string);
            self.cache(1)?;
        }
        if string.is_empty() {
            self.error(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
            )
        } else if !self.is_blankz() {
            self.error(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
            )
        } else {
            Ok(string)
        }
    }

    fn scan_version_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(i32, i32), ScannerError> {
        self.cache(1)?;
        while self.is_blank() {
            self.skip();
            self.cache(1)?;
        }
        let major = self.scan_version_directive_number(start_mark)?;
        if !self.check('.') {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected digit or '.' character",
            );
        }
        self.skip();
        let minor = self.scan_version_directive_number(start_mark)?;
        Ok((major, minor))
    }

    fn scan_version_directive_number(&mut self, start_mark: Mark) -> Result<i32, ScannerError> {
        let mut value: i32 = 0;
        let mut length: u64 = 0;
        self.cache(1)?;
        while self.is_digit() {
            length += 1;
            if length > MAX_VERSION_NUMBER_LENGTH {
                return self.error(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                );
            }
            value = value * 10 + self.as_digit() as i32;
            self.skip();
            self.cache(1)?;
        }
        if length == 0 {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
            );
        }
        Ok(value)
    }

    fn scan_tag_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(String, String), ScannerError> {
        self.cache(1)?;
        loop {
            if self.is_blank() {
                self.skip();
                self.cache(1)?;
                continue;
            }
            let handle = self.scan_tag_handle(true, start_mark)?;
            self.cache(1)?;
            if !self.is_blank() {
                return self.error(
                    "while scanning a %TAG directive",
                    start_mark,
                    "did not find expected whitespace",
                );
            }
            while self.is_blank() {
                self.skip();
                self.cache(1)?;
            }
            let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
            self.cache(1)?;
            if !self.is_blankz() {
                return self.error(
                    "while scanning a %TAG directive",
                    start_mark,
                    "did not find expected whitespace or line break",
                );
            }
            return Ok((handle, prefix));
        }
    }

    // --- anchors, aliases, tags ---

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScannerError> {
        let mut length = 0;
        let mut string = String::new();
        let start_mark = self.mark();
        self.skip();
        self.cache(1)?;
        while self.is_alpha() {
            self.read_string(&mut string);
            self.cache(1)?;
            length += 1;
        }
        let end_mark = self.mark();
        if length == 0
            || !(self.is_blankz()
                || self.check('?')
                || self.check(':')
                || self.check(',')
                || self.check(']')
                || self.check('}')
                || self.check('%')
                || self.check('@')
                || self.check('`'))
        {
            self.error(
                if alias {
                    "while scanning an alias"
                } else {
                    "while scanning an anchor"
                },
                start_mark,
                "did not find expected alphabetic or numeric character",
            )
        } else {
            let data = if alias {
                TokenData::Alias { value: string }
            } else {
                TokenData::Anchor { value: string }
            };
            Ok(Token {
                data,
                start_mark,
                end_mark,
            })
        }
    }

    fn scan_tag(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark();
        self.cache(2)?;

        let (handle, suffix) = if self.check_at('<', 1) {
            self.skip();
            self.skip();
            let suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if !self.check('>') {
                return self.error(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                );
            }
            self.skip();
            (String::new(), suffix)
        } else {
            let handle = self.scan_tag_handle(false, start_mark)?;
            if handle.starts_with('!') && handle.len() > 1 && handle.ends_with('!') {
                let suffix = self.scan_tag_uri(false, false, None, start_mark)?;
                (handle, suffix)
            } else {
                let scanned = self.scan_tag_uri(false, false, Some(&handle), start_mark)?;
                if scanned.is_empty() {
                    (String::new(), handle)
                } else {
                    (String::from("!"), scanned)
                }
            }
        };

        self.cache(1)?;
        if !self.is_blankz() {
            if self.flow_level == 0 || !self.check(',') {
                return self.error(
                    "while scanning a tag",
                    start_mark,
                    "did not find expected whitespace or line break",
                );
            }
        }

        let end_mark = self.mark();
        Ok(Token {
            data: TokenData::Tag { handle, suffix },
            start_mark,
            end_mark,
        })
    }

    fn scan_tag_handle(
        &mut self,
        directive: bool,
        start_mark: Mark,
    ) -> Result<String, ScannerError> {
        let mut string = String::new();
        self.cache(1)?;
        if !self.check('!') {
            return self.error(
                if directive {
                    "while scanning a tag directive"
                } else {
                    "while scanning a tag"
                },
                start_mark,
                "did not find expected '!'",
            );
        }
        self.read_string(&mut string);
        self.cache(1)?;
        while self.is_alpha() {
            self.read_string(&mut string);
            self.cache(1)?;
        }
        if self.check('!') {
            self.read_string(&mut string);
        } else if directive && string != "!" {
            return self.error(
                "while parsing a tag directive",
                start_mark,
                "did not find expected '!'",
            );
        }
        Ok(string)
    }

    fn scan_tag_uri(
        &mut self,
        uri_char: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, ScannerError> {
        let head = head.unwrap_or("");
        let mut length = head.len();
        let mut string = if length > 1 {
            String::from(&head[1..])
        } else {
            String::new()
        };
        self.cache(1)?;

        while self.is_alpha()
            || self.check(';')
            || self.check('/')
            || self.check('?')
            || self.check(':')
            || self.check('@')
            || self.check('&')
            || self.check('=')
            || self.check('+')
            || self.check('$')
            || self.check('.')
            || self.check('%')
            || self.check('!')
            || self.check('~')
            || self.check('*')
            || self.check('\'')
            || self.check('(')
            || self.check(')')
            || uri_char && (self.check(',') || self.check('[') || self.check(']'))
        {
            if self.check('%') {
                self.scan_uri_escapes(directive, start_mark, &mut string)?;
            } else {
                self.read_string(&mut string);
            }
            length += 1;
            self.cache(1)?;
        }
        if length == 0 {
            self.error(
                if directive {
                    "while parsing a %TAG directive"
                } else {
                    "while parsing a tag"
                },
                start_mark,
                "did not find expected tag URI",
            )
        } else {
            Ok(string)
        }
    }

    /// Percent-decodes escaped octets. Like libyaml, each decoded octet is
    /// pushed as its own `char`: correct for the ASCII range %TAG prefixes
    /// actually use, a simplification for genuinely multi-byte sequences.
    fn scan_uri_escapes(
        &mut self,
        directive: bool,
        start_mark: Mark,
        string: &mut String,
    ) -> Result<(), ScannerError> {
        let mut width = 0;
        loop {
            self.cache(3)?;
            if !(self.check('%') && self.is_hex_at(1) && self.is_hex_at(2)) {
                return self.error(
                    if directive {
                        "while parsing a %TAG directive"
                    } else {
                        "while parsing a tag"
                    },
                    start_mark,
                    "did not find URI escaped octet",
                );
            }
            let octet = ((self.as_hex_at(1) << 4) + self.as_hex_at(2)) as u8;
            if width == 0 {
                width = if octet & 0x80 == 0 {
                    1
                } else if octet & 0xE0 == 0xC0 {
                    2
                } else if octet & 0xF0 == 0xE0 {
                    3
                } else if octet & 0xF8 == 0xF0 {
                    4
                } else {
                    0
                };
                if width == 0 {
                    return self.error(
                        if directive {
                            "while parsing a %TAG directive"
                        } else {
                            "while parsing a tag"
                        },
                        start_mark,
                        "found an incorrect leading UTF-8 octet",
                    );
                }
            } else if octet & 0xC0 != 0x80 {
                return self.error(
                    if directive {
                        "while parsing a %TAG directive"
                    } else {
                        "while parsing a tag"
                    },
                    start_mark,
                    "found an incorrect trailing UTF-8 octet",
                );
            }
            string.push(char::from_u32(octet as u32).expect("a byte is always a valid scalar"));
            self.skip();
            self.skip();
            self.skip();
            width -= 1;
            if width == 0 {
                break;
            }
        }
        Ok(())
    }

    // --- block scalars ---

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut chomping = 0i32;
        let mut increment = 0i32;
        let mut indent = 0i32;
        let mut leading_blank = false;
        let start_mark = self.mark();
        self.skip();
        self.cache(1)?;

        if self.check('+') || self.check('-') {
            chomping = if self.check('+') { 1 } else { -1 };
            self.skip();
            self.cache(1)?;
            if self.is_digit() {
                if self.check('0') {
                    return self.error(
                        "while scanning a block scalar",
                        start_mark,
                        "found an indentation indicator equal to 0",
                    );
                }
                increment = self.as_digit() as i32;
                self.skip();
            }
        } else if self.is_digit() {
            if self.check('0') {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found an indentation indicator equal to 0",
                );
            }
            increment = self.as_digit() as i32;
            self.skip();
            self.cache(1)?;
            if self.check('+') || self.check('-') {
                chomping = if self.check('+') { 1 } else { -1 };
                self.skip();
            }
        }

        self.cache(1)?;
        while self.is_blank() {
            self.skip();
            self.cache(1)?;
        }
        if self.check('#') {
            while !self.is_breakz() {
                self.skip();
                self.cache(1)?;
            }
        }
        if !self.is_breakz() {
            return self.error(
                "while scanning a block scalar",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if self.is_break() {
            self.cache(2)?;
            self.skip_line();
        }

        let mut end_mark = self.mark();
        if increment != 0 {
            indent = if self.indent >= 0 {
                self.indent as i32 + increment
            } else {
                increment
            };
        }
        self.scan_block_scalar_breaks(
            &mut indent,
            &mut trailing_breaks,
            start_mark,
            &mut end_mark,
        )?;

        self.cache(1)?;
        while self.mark().column as i32 == indent && !self.is_z() {
            let trailing_blank = self.is_blank();
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();
            leading_blank = self.is_blank();
            while !self.is_breakz() {
                self.read_string(&mut string);
                self.cache(1)?;
            }
            self.cache(2)?;
            self.read_line_string(&mut leading_break);
            self.scan_block_scalar_breaks(
                &mut indent,
                &mut trailing_breaks,
                start_mark,
                &mut end_mark,
            )?;
        }

        if chomping != -1 {
            string.push_str(&leading_break);
        }
        if chomping == 1 {
            string.push_str(&trailing_breaks);
        }

        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: if literal {
                    ScalarStyle::Literal
                } else {
                    ScalarStyle::Folded
                },
            },
            start_mark,
            end_mark,
        })
    }

    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i32,
        breaks: &mut String,
        start_mark: Mark,
        end_mark: &mut Mark,
    ) -> Result<(), ScannerError> {
        let mut max_indent = 0;
        *end_mark = self.mark();
        loop {
            self.cache(1)?;
            while (*indent == 0 || (self.mark().column as i32) < *indent) && self.is_space() {
                self.skip();
                self.cache(1)?;
            }
            if self.mark().column as i32 > max_indent {
                max_indent = self.mark().column as i32;
            }
            if (*indent == 0 || (self.mark().column as i32) < *indent) && self.is_tab() {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                );
            }
            if !self.is_break() {
                break;
            }
            self.cache(2)?;
            self.read_line_string(breaks);
            *end_mark = self.mark();
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent as i32 + 1).max(1);
        }
        Ok(())
    }

    // --- quoted scalars ---

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();

        let start_mark = self.mark();
        self.skip();
        loop {
            self.cache(4)?;

            if self.mark().column == 0
                && ((self.check_at('-', 0) && self.check_at('-', 1) && self.check_at('-', 2))
                    || (self.check_at('.', 0) && self.check_at('.', 1) && self.check_at('.', 2)))
                && self.is_blankz_at(3)
            {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected document indicator",
                );
            }
            if self.is_z() {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected end of stream",
                );
            }

            self.cache(2)?;
            let mut leading_blanks = false;
            while !self.is_blankz() {
                if single && self.check_at('\'', 0) && self.check_at('\'', 1) {
                    string.push('\'');
                    self.skip();
                    self.skip();
                } else if self.check(if single { '\'' } else { '"' }) {
                    break;
                } else if !single && self.check('\\') && self.is_break_at(1) {
                    self.cache(3)?;
                    self.skip();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && self.check('\\') {
                    let mut code_length = 0usize;
                    match self.peek(1).unwrap() {
                        '0' => string.push('\0'),
                        'a' => string.push('\x07'),
                        'b' => string.push('\x08'),
                        't' | '\t' => string.push('\t'),
                        'n' => string.push('\n'),
                        'v' => string.push('\x0b'),
                        'f' => string.push('\x0c'),
                        'r' => string.push('\r'),
                        'e' => string.push('\x1b'),
                        ' ' => string.push(' '),
                        '"' => string.push('"'),
                        '/' => string.push('/'),
                        '\\' => string.push('\\'),
                        'N' => string.push('\u{0085}'),
                        '_' => string.push('\u{00a0}'),
                        'L' => string.push('\u{2028}'),
                        'P' => string.push('\u{2029}'),
                        'x' => code_length = 2,
                        'u' => code_length = 4,
                        'U' => code_length = 8,
                        _ => {
                            return self.error(
                                "while parsing a quoted scalar",
                                start_mark,
                                "found unknown escape character",
                            );
                        }
                    }
                    self.skip();
                    self.skip();
                    if code_length != 0 {
                        self.cache(code_length)?;
                        let mut value: u32 = 0;
                        for k in 0..code_length {
                            if !self.is_hex_at(k) {
                                return self.error(
                                    "while parsing a quoted scalar",
                                    start_mark,
                                    "did not find expected hexdecimal number",
                                );
                            }
                            value = (value << 4) + self.as_hex_at(k);
                        }
                        match char::from_u32(value) {
                            Some(ch) => string.push(ch),
                            None => {
                                return self.error(
                                    "while parsing a quoted scalar",
                                    start_mark,
                                    "found invalid Unicode character escape code",
                                );
                            }
                        }
                        for _ in 0..code_length {
                            self.skip();
                        }
                    }
                } else {
                    self.read_string(&mut string);
                }
                self.cache(2)?;
            }
            self.cache(1)?;
            if self.check(if single { '\'' } else { '"' }) {
                break;
            }
            self.cache(1)?;
            while self.is_blank() || self.is_break() {
                if self.is_blank() {
                    if !leading_blanks {
                        self.read_string(&mut whitespaces);
                    } else {
                        self.skip();
                    }
                } else {
                    self.cache(2)?;
                    if !leading_blanks {
                        whitespaces.clear();
                        self.read_line_string(&mut leading_break);
                        leading_blanks = true;
                    } else {
                        self.read_line_string(&mut trailing_breaks);
                    }
                }
                self.cache(1)?;
            }
            if leading_blanks {
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                    leading_break.clear();
                } else {
                    string.push_str(&leading_break);
                    string.push_str(&trailing_breaks);
                    leading_break.clear();
                    trailing_breaks.clear();
                }
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        self.skip();
        let end_mark = self.mark();
        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: if single {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                },
            },
            start_mark,
            end_mark,
        })
    }

    // --- plain scalars ---

    fn scan_plain_scalar(&mut self) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;
        let indent = self.indent + 1;
        let mut end_mark = self.mark();
        let start_mark = end_mark;

        loop {
            self.cache(4)?;
            if self.mark().column == 0
                && ((self.check_at('-', 0) && self.check_at('-', 1) && self.check_at('-', 2))
                    || (self.check_at('.', 0) && self.check_at('.', 1) && self.check_at('.', 2)))
                && self.is_blankz_at(3)
            {
                break;
            }
            if self.check('#') {
                break;
            }
            while !self.is_blankz() {
                if self.flow_level != 0
                    && self.check(':')
                    && (self.check_at(',', 1)
                        || self.check_at('?', 1)
                        || self.check_at('[', 1)
                        || self.check_at(']', 1)
                        || self.check_at('{', 1)
                        || self.check_at('}', 1))
                {
                    return self.error(
                        "while scanning a plain scalar",
                        start_mark,
                        "found unexpected ':'",
                    );
                }
                if self.check(':') && self.is_blankz_at(1)
                    || self.flow_level != 0
                        && (self.check(',')
                            || self.check('[')
                            || self.check(']')
                            || self.check('{')
                            || self.check('}'))
                {
                    break;
                }
                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break.starts_with('\n') {
                            if trailing_breaks.is_empty() {
                                string.push(' ');
                            } else {
                                string.push_str(&trailing_breaks);
                                trailing_breaks.clear();
                            }
                            leading_break.clear();
                        } else {
                            string.push_str(&leading_break);
                            string.push_str(&trailing_breaks);
                            leading_break.clear();
                            trailing_breaks.clear();
                        }
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }
                self.read_string(&mut string);
                end_mark = self.mark();
                self.cache(2)?;
            }
            if !(self.is_blank() || self.is_break()) {
                break;
            }
            self.cache(1)?;
            while self.is_blank() || self.is_break() {
                if self.is_blank() {
                    if leading_blanks && (self.mark().column as i64) < indent && self.is_tab() {
                        return self.error(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                        );
                    } else if !leading_blanks {
                        self.read_string(&mut whitespaces);
                    } else {
                        self.skip();
                    }
                } else {
                    self.cache(2)?;
                    if !leading_blanks {
                        whitespaces.clear();
                        self.read_line_string(&mut leading_break);
                        leading_blanks = true;
                    } else {
                        self.read_line_string(&mut trailing_breaks);
                    }
                }
                self.cache(1)?;
            }
            if self.flow_level == 0 && (self.mark().column as i64) < indent {
                break;
            }
        }

        if leading_blanks {
            self.simple_key_allowed = true;
        }

        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;

    fn scan_all(input: &str) -> Vec<TokenData> {
        let mut scanner = Scanner::new();
        scanner.set_input_string(input.as_bytes());
        let mut tokens = Vec::new();
        loop {
            let token = scanner.scan().unwrap();
            let done = matches!(token.data, TokenData::StreamEnd);
            tokens.push(token.data);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn stream_start_carries_encoding() {
        let tokens = scan_all("a: 1\n");
        assert!(matches!(
            tokens[0],
            TokenData::StreamStart {
                encoding: Encoding::Utf8
            }
        ));
    }

    #[test]
    fn simple_key_inserted_before_scalar() {
        let tokens = scan_all("a: 1\n");
        // BLOCK-MAPPING-START, KEY, SCALAR("a"), VALUE, SCALAR("1"), BLOCK-END, STREAM-END
        assert!(matches!(tokens[1], TokenData::BlockMappingStart));
        assert!(matches!(tokens[2], TokenData::Key));
        assert!(matches!(&tokens[3], TokenData::Scalar { value, .. } if value == "a"));
        assert!(matches!(tokens[4], TokenData::Value));
        assert!(matches!(&tokens[5], TokenData::Scalar { value, .. } if value == "1"));
        assert!(matches!(tokens[6], TokenData::BlockEnd));
    }

    #[test]
    fn indentless_sequence_under_key_has_no_block_sequence_start() {
        let tokens = scan_all("key:\n- a\n- b\n");
        assert!(!tokens
            .iter()
            .any(|t| matches!(t, TokenData::BlockSequenceStart)));
        let entries = tokens
            .iter()
            .filter(|t| matches!(t, TokenData::BlockEntry))
            .count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn flow_sequence_ignores_indentation() {
        let tokens = scan_all("[1, 2, 3]\n");
        assert!(matches!(tokens[1], TokenData::FlowSequenceStart));
        assert!(matches!(tokens.last(), Some(TokenData::StreamEnd)));
    }

    #[test]
    fn dedent_at_eof_closes_every_open_block() {
        let tokens = scan_all("a:\n  b:\n    c: 1\n");
        let block_ends = tokens
            .iter()
            .filter(|t| matches!(t, TokenData::BlockEnd))
            .count();
        let block_starts = tokens
            .iter()
            .filter(|t| matches!(t, TokenData::BlockMappingStart))
            .count();
        assert_eq!(block_ends, block_starts);
    }

    #[test]
    fn simple_key_cannot_cross_1024_characters() {
        let long_key = "a".repeat(1100);
        let input = format!("{long_key}: 1\n");
        let mut scanner = Scanner::new();
        scanner.set_input_string(input.as_bytes());
        let mut last = Ok(Token {
            data: TokenData::StreamEnd,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        });
        loop {
            last = scanner.scan();
            if last.is_err() {
                break;
            }
            if matches!(last, Ok(Token { data: TokenData::StreamEnd, .. })) {
                break;
            }
        }
        assert!(last.is_err(), "a 1100-char simple key must not resolve");
    }

    #[test]
    fn single_quoted_doubled_quote_is_an_escape() {
        let tokens = scan_all("'it''s'\n");
        assert!(matches!(&tokens[1], TokenData::Scalar { value, style }
            if value == "it's" && *style == ScalarStyle::SingleQuoted));
    }

    #[test]
    fn double_quoted_handles_unicode_escapes() {
        let tokens = scan_all("\"\\u0041\\x42\"\n");
        assert!(matches!(&tokens[1], TokenData::Scalar { value, .. } if value == "AB"));
    }

    #[test]
    fn tab_rejected_in_block_indent() {
        let mut scanner = Scanner::new();
        scanner.set_input_string(b"foo:\n\tbar\n");
        let mut result = Ok(());
        loop {
            match scanner.scan() {
                Ok(token) => {
                    if matches!(token.data, TokenData::StreamEnd) {
                        break;
                    }
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        assert!(result.is_err());
    }

    #[test]
    fn tab_allowed_in_flow() {
        let tokens = scan_all("[1,\t2]\n");
        assert!(matches!(tokens.last(), Some(TokenData::StreamEnd)));
    }

    #[test]
    fn literal_block_scalar_preserves_newlines() {
        let tokens = scan_all("a: |\n  one\n  two\n");
        assert!(matches!(&tokens[4], TokenData::Scalar { value, style }
            if value == "one\ntwo\n" && *style == ScalarStyle::Literal));
    }

    #[test]
    fn folded_block_scalar_folds_single_breaks() {
        let tokens = scan_all("a: >\n  one\n  two\n");
        assert!(matches!(&tokens[4], TokenData::Scalar { value, style }
            if value == "one two\n" && *style == ScalarStyle::Folded));
    }

    #[test]
    fn literal_strip_chomping_drops_trailing_newline() {
        let tokens = scan_all("a: |-\n  one\n");
        assert!(matches!(&tokens[4], TokenData::Scalar { value, .. } if value == "one"));
    }
}
