// grammar loader: drives a 3 state machine over the token stream
//
//   ExpectLhs --identifier--> ExpectArrow --(-> | :=)--> ExpectRhs
//   ExpectRhs --symbol--> ExpectRhs
//   ExpectRhs --'|'--> ExpectRhs   (ends an alternative)
//   ExpectRhs --';'--> ExpectLhs   (ends the group)
//
// the first non-terminal seen creates S' and rule 0: S' -> S $

use std::collections::HashMap;

use log::debug;
use lrgen_lex::{GrammarLexer, Location, Token, TokenKind, TokenStream};
use lrgen_util::push_unique;

use crate::{
    error::{GrammarErrorKind, LrError, Result},
    limits::{Capacity, Limits},
};

use super::{
    Grammar, GrammarStats, NonTerminalId, Rule, RuleId, Symbol, SymbolInfo, TerminalId,
    END_OF_INPUT_NAME,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Name given to the synthesized start symbol. Grammars may not use it.
    pub start_name: String,
    /// Drop the quotes around terminals in their display strings.
    pub strip_quotes: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            start_name: "S'".to_string(),
            strip_quotes: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoaderState {
    ExpectLhs,
    ExpectArrow,
    ExpectRhs,
}

struct Group {
    lhs: NonTerminalId,
    rhs: Vec<Symbol>,
    seen_epsilon: bool,
}

struct Loader<'a> {
    options: &'a LoaderOptions,
    limits: &'a Limits,

    terminals: Vec<SymbolInfo>,
    non_terminals: Vec<SymbolInfo>,
    rules: Vec<Rule>,
    terminal_names: HashMap<String, TerminalId>,
    non_terminal_names: HashMap<String, NonTerminalId>,
    // where each non-terminal was first mentioned, for undefined-symbol diagnostics
    first_use: Vec<Location>,

    start: Option<(NonTerminalId, NonTerminalId)>,
}

impl<'a> Loader<'a> {
    fn new(options: &'a LoaderOptions, limits: &'a Limits) -> Self {
        Self {
            options,
            limits,
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            rules: Vec::new(),
            terminal_names: HashMap::new(),
            non_terminal_names: HashMap::new(),
            first_use: Vec::new(),
            start: None,
        }
    }

    fn check_name(&self, name: &str) -> Result<()> {
        self.limits
            .ensure(Capacity::NameLength, name.chars().count())
    }

    fn check_symbol_count(&self) -> Result<()> {
        self.limits.ensure(
            Capacity::Symbols,
            self.terminals.len() + self.non_terminals.len() + 1,
        )
    }

    fn push_non_terminal(&mut self, name: &str, location: Location) -> Result<NonTerminalId> {
        self.check_name(name)?;
        self.check_symbol_count()?;
        let id = NonTerminalId::from_push(&mut self.non_terminals, SymbolInfo::new(name.to_string()));
        self.non_terminal_names.insert(name.to_string(), id);
        self.first_use.push(location);
        Ok(id)
    }

    fn non_terminal(&mut self, name: &str, location: Location) -> Result<NonTerminalId> {
        if name == self.options.start_name {
            return Err(LrError::grammar(
                location,
                GrammarErrorKind::ReservedName(name.to_string()),
            ));
        }

        if let Some(id) = self.non_terminal_names.get(name) {
            return Ok(*id);
        }

        if self.start.is_none() {
            let start_name = self.options.start_name.clone();
            let start = self.push_non_terminal(&start_name, location)?;
            let original = self.push_non_terminal(name, location)?;
            self.start = Some((start, original));
            self.push_rule(start, vec![Symbol::NonTerminal(original), Symbol::EndOfInput])?;
            return Ok(original);
        }

        self.push_non_terminal(name, location)
    }

    fn terminal(&mut self, text: &str, quote: char) -> Result<Symbol> {
        if text == END_OF_INPUT_NAME {
            return Ok(Symbol::EndOfInput);
        }

        let name = if self.options.strip_quotes {
            text.to_string()
        } else {
            format!("{}{}{}", quote, text, quote)
        };

        if let Some(id) = self.terminal_names.get(&name) {
            return Ok(Symbol::Terminal(*id));
        }

        self.check_name(&name)?;
        self.check_symbol_count()?;
        let id = TerminalId::from_push(&mut self.terminals, SymbolInfo::new(name.clone()));
        self.terminal_names.insert(name, id);
        Ok(Symbol::Terminal(id))
    }

    fn push_rule(&mut self, lhs: NonTerminalId, rhs: Vec<Symbol>) -> Result<RuleId> {
        self.limits.ensure(Capacity::Rules, self.rules.len() + 1)?;
        let id = RuleId::new(self.rules.len());
        push_unique(&mut self.non_terminals[lhs].lhs_rules, id);
        for symbol in &rhs {
            match symbol {
                Symbol::Terminal(t) => {
                    push_unique(&mut self.terminals[*t].rhs_rules, id);
                }
                Symbol::NonTerminal(nt) => {
                    push_unique(&mut self.non_terminals[*nt].rhs_rules, id);
                }
                Symbol::Epsilon | Symbol::EndOfInput => {}
            }
        }
        self.rules.push(Rule { lhs, rhs });
        Ok(id)
    }

    fn finish_alternative(&mut self, group: &mut Group, location: Location) -> Result<()> {
        let rhs = std::mem::take(&mut group.rhs);
        if rhs.is_empty() {
            if group.seen_epsilon {
                let name = self.non_terminals[group.lhs].name.clone();
                return Err(LrError::grammar(
                    location,
                    GrammarErrorKind::DuplicateEpsilon(name),
                ));
            }
            group.seen_epsilon = true;
        }
        self.push_rule(group.lhs, rhs)?;
        Ok(())
    }

    fn run(&mut self, tokens: &mut impl TokenStream) -> Result<Location> {
        let mut state = LoaderState::ExpectLhs;
        let mut group: Option<Group> = None;

        loop {
            let Token { kind, location } = tokens.advance();

            if let TokenKind::Error(e) = kind {
                return Err(LrError::grammar(location, GrammarErrorKind::Lex(e)));
            }

            let unexpected = |expected: &'static str, found: &TokenKind| {
                LrError::grammar(
                    location,
                    GrammarErrorKind::Unexpected {
                        expected,
                        found: found.to_string(),
                    },
                )
            };

            state = match state {
                LoaderState::ExpectLhs => match kind {
                    TokenKind::EndOfFile => return Ok(location),
                    TokenKind::Identifier(name) => {
                        let lhs = self.non_terminal(&name, location)?;
                        group = Some(Group {
                            lhs,
                            rhs: Vec::new(),
                            seen_epsilon: false,
                        });
                        LoaderState::ExpectArrow
                    }
                    TokenKind::SingleQuoted(text) | TokenKind::DoubleQuoted(text) => {
                        return Err(LrError::grammar(
                            location,
                            GrammarErrorKind::TerminalOnLeft(text),
                        ));
                    }
                    other => return Err(unexpected("a lefthand non-terminal", &other)),
                },
                LoaderState::ExpectArrow => match kind {
                    TokenKind::Reserved(_) => LoaderState::ExpectRhs,
                    other => return Err(unexpected("`->` or `:=`", &other)),
                },
                LoaderState::ExpectRhs => {
                    let current = group
                        .as_mut()
                        .ok_or_else(|| LrError::Internal("righthand side without a group".into()))?;
                    match kind {
                        TokenKind::Identifier(name) => {
                            let nt = self.non_terminal(&name, location)?;
                            current.rhs.push(Symbol::NonTerminal(nt));
                            LoaderState::ExpectRhs
                        }
                        TokenKind::SingleQuoted(text) => {
                            let symbol = self.terminal(&text, '\'')?;
                            current.rhs.push(symbol);
                            LoaderState::ExpectRhs
                        }
                        TokenKind::DoubleQuoted(text) => {
                            let symbol = self.terminal(&text, '"')?;
                            current.rhs.push(symbol);
                            LoaderState::ExpectRhs
                        }
                        TokenKind::Delimiter('|') => {
                            self.finish_alternative(current, location)?;
                            LoaderState::ExpectRhs
                        }
                        TokenKind::Delimiter(';') => {
                            self.finish_alternative(current, location)?;
                            group = None;
                            LoaderState::ExpectLhs
                        }
                        other => {
                            return Err(unexpected("a righthand symbol, `|` or `;`", &other));
                        }
                    }
                }
            };
        }
    }

    fn finish(self, eof: Location) -> Result<Grammar> {
        let (start, original_start) = self
            .start
            .ok_or_else(|| LrError::grammar(eof, GrammarErrorKind::EmptyGrammar))?;

        for (info, location) in self.non_terminals.iter().zip(&self.first_use) {
            if info.lhs_rules.is_empty() {
                return Err(LrError::grammar(
                    *location,
                    GrammarErrorKind::UndefinedNonTerminal(info.name.clone()),
                ));
            }
        }

        let names = self.terminals.iter().chain(&self.non_terminals);
        let stats = GrammarStats {
            terminals: self.terminals.len(),
            non_terminals: self.non_terminals.len(),
            rules: self.rules.len(),
            epsilon_rules: self.rules.iter().filter(|r| r.is_epsilon()).count(),
            longest_name: names.clone().map(|s| s.name.chars().count()).max().unwrap_or(0),
            total_name_len: names.map(|s| s.name.chars().count()).sum(),
        };

        Ok(Grammar {
            terminals: self.terminals,
            non_terminals: self.non_terminals,
            rules: self.rules,
            start,
            original_start,
            terminal_names: self.terminal_names,
            non_terminal_names: self.non_terminal_names,
            stats,
        })
    }
}

impl Grammar {
    /// Tokenizes and loads a grammar source.
    pub fn load(source: &str, options: &LoaderOptions, limits: &Limits) -> Result<Grammar> {
        let mut lexer = GrammarLexer::new(source);
        Self::from_tokens(&mut lexer, options, limits)
    }

    /// Loads a grammar from any token stream.
    pub fn from_tokens(
        tokens: &mut impl TokenStream,
        options: &LoaderOptions,
        limits: &Limits,
    ) -> Result<Grammar> {
        let mut loader = Loader::new(options, limits);
        let eof = loader.run(tokens)?;
        let grammar = loader.finish(eof)?;

        let stats = grammar.stats();
        debug!(
            "loaded grammar: {} terminals, {} non-terminals, {} rules ({} epsilon), longest name {}, total name length {}",
            stats.terminals,
            stats.non_terminals,
            stats.rules,
            stats.epsilon_rules,
            stats.longest_name,
            stats.total_name_len
        );
        Ok(grammar)
    }
}
