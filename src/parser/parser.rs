//! Precedence-climbing parser for the design notation.
//!
//! Levels, loosest to tightest:
//!
//! ```text
//! confounding     a ≈≈ b          left-assoc
//! batch           a == b          left-assoc
//! crossing        a × b, a ◊ b    left-assoc
//! nesting         a > b           left-assoc
//! classification  a : b           right-assoc, terminal
//! primary         Name(3) | {A ≈≈ B} | ( expr )
//! ```
//!
//! Every operator emits edges from the tails of its left operand to the
//! heads of its right operand. Classification edges are held back until the
//! end of the expression so a classified factor never appears in a later
//! edge of the same expression.

use rustc_hash::FxHashSet;
use text_size::TextRange;
use tracing::{debug, trace};

use super::errors::{
    ErrorCode, LimitExceededError, ParseContext, ParseError, SyntaxError, SyntaxErrorBuilder,
    context_message,
};
use super::lexer::{Token, tokenize};
use super::syntax_kind::SyntaxKind;
use crate::base::LineIndex;
use crate::model::{Design, DesignError, FactorId, FactorKind, FactorSize, RelationKind};

/// Parser limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum depth of parentheses, confound groups and classification
    /// chains.
    pub max_depth: usize,
    /// Maximum number of members in a confound group or branches in an
    /// unbalanced size.
    pub max_group_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_group_size: 1024,
        }
    }
}

/// Parse notation text into a new design.
pub fn parse(text: &str) -> Result<Design, ParseError> {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Design, ParseError> {
    let mut design = Design::new();
    parse_into(&mut design, text, options)?;
    Ok(design)
}

/// Parse more notation into an existing design.
///
/// Names already in the design are references. On error the design is
/// left unchanged.
pub fn parse_into(design: &mut Design, text: &str, options: &ParseOptions) -> Result<(), ParseError> {
    let tokens = tokenize(text)?;
    let mut scratch = design.clone();
    let expressions = {
        let mut parser = Parser::new(text, tokens, &mut scratch, options);
        parser.parse_document()?;
        parser.expressions
    };
    debug!(
        expressions,
        factors = scratch.factor_count(),
        relationships = scratch.relationships().len(),
        "parsed design notation"
    );
    *design = scratch;
    Ok(())
}

// ============================================================================
// Operands
// ============================================================================

/// The result of parsing a sub-expression.
#[derive(Debug, Clone)]
struct Operand {
    /// Factors that receive edges when this operand is on the right.
    heads: Vec<FactorId>,
    /// Factors that emit edges when this operand is on the left.
    tails: Vec<FactorId>,
    /// A classification was applied; no operator may follow.
    classified: bool,
    range: TextRange,
}

impl Operand {
    fn single(id: FactorId, range: TextRange) -> Self {
        Self {
            heads: vec![id],
            tails: vec![id],
            classified: false,
            range,
        }
    }

    fn merge(mut self, other: Operand) -> Self {
        union(&mut self.heads, &other.heads);
        union(&mut self.tails, &other.tails);
        self.classified = other.classified;
        self.range = self.range.cover(other.range);
        self
    }
}

/// A nesting chain `L1 > L2 > ... > Ln`.
#[derive(Debug)]
struct Chain {
    first: Operand,
    rest: Vec<Operand>,
}

impl Chain {
    fn last(&self) -> &Operand {
        self.rest.last().unwrap_or(&self.first)
    }

    fn range(&self) -> TextRange {
        self.first.range.cover(self.last().range)
    }

    fn into_operand(self) -> Operand {
        let tails = self.last().tails.clone();
        let classified = self.last().classified;
        let range = self.range();
        Operand {
            heads: self.first.heads,
            tails,
            classified,
            range,
        }
    }
}

fn union(into: &mut Vec<FactorId>, from: &[FactorId]) {
    for id in from {
        if !into.contains(id) {
            into.push(*id);
        }
    }
}

/// A classification edge waiting for the end of its expression.
#[derive(Debug)]
struct Deferred {
    subject: FactorId,
    classifier: FactorId,
    op: TextRange,
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a, 'd> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    design: &'d mut Design,
    options: &'d ParseOptions,
    line_index: LineIndex<'a>,
    depth: usize,
    /// Factors registered by the expression being parsed.
    declared: FxHashSet<FactorId>,
    deferred: Vec<Deferred>,
    expressions: usize,
}

impl<'a, 'd> Parser<'a, 'd> {
    fn new(
        text: &'a str,
        tokens: Vec<Token<'a>>,
        design: &'d mut Design,
        options: &'d ParseOptions,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            design,
            options,
            line_index: LineIndex::new(text),
            depth: 0,
            declared: FxHashSet::default(),
            deferred: Vec::new(),
            expressions: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------------

    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn current_range(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or_else(TextRange::default, Token::range)
    }

    fn current_text(&self) -> &'a str {
        self.tokens.get(self.pos).map_or("", |t| t.text)
    }

    fn bump(&mut self) -> TextRange {
        let range = self.current_range();
        if self.pos < self.tokens.len() && !self.at(SyntaxKind::EOF) {
            self.pos += 1;
        }
        range
    }

    fn at_line_start(&self) -> bool {
        let previous = self.line_index.position(self.previous_range().end());
        let current = self.line_index.position(self.current_range().start());
        current.line > previous.line
    }

    fn previous_range(&self) -> TextRange {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or_else(TextRange::default, Token::range)
    }

    // ------------------------------------------------------------------------
    // Errors and limits
    // ------------------------------------------------------------------------

    fn error(&self, code: ErrorCode, range: TextRange) -> SyntaxErrorBuilder {
        SyntaxError::builder(code)
            .range(range)
            .position(self.line_index.position(range.start()))
    }

    fn unexpected(&self, context: ParseContext) -> ParseError {
        let range = self.current_range();
        let kind = self.current();
        let builder = match kind {
            SyntaxKind::EOF => self
                .error(ErrorCode::E0401, range)
                .message(format!("expected {}, found end of input", context.expected_description())),
            k if k.is_closing_delimiter() => self
                .error(ErrorCode::E0204, range)
                .message(format!("unexpected closing {}", k.describe()))
                .hint("remove it or add the matching opening delimiter"),
            k if k.is_operator() && context == ParseContext::Operand => self
                .error(ErrorCode::E0401, range)
                .message(format!("expected an operand, found operator {}", k.describe())),
            k => self
                .error(ErrorCode::E0901, range)
                .message(context_message(k.describe(), context)),
        };
        builder.build().into()
    }

    fn classified_error(&self, op: TextRange, op_text: &str) -> ParseError {
        self.error(ErrorCode::E0402, op)
            .message(format!("'{op_text}' cannot be applied to a classified operand"))
            .hint("classification must be the last operation in an expression")
            .build()
            .into()
    }

    fn enter(&mut self, at: TextRange) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.limit("nesting depth", self.options.max_depth, self.depth, at));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn limit(&self, what: &'static str, limit: usize, depth: usize, at: TextRange) -> ParseError {
        LimitExceededError {
            what,
            limit,
            depth,
            offset: at.start(),
            position: self.line_index.position(at.start()),
        }
        .into()
    }

    fn expect_closing(
        &mut self,
        closing: SyntaxKind,
        open: TextRange,
        context: ParseContext,
    ) -> Result<TextRange, ParseError> {
        if self.at(closing) {
            return Ok(self.bump());
        }
        let code = match closing {
            SyntaxKind::R_PAREN => ErrorCode::E0201,
            SyntaxKind::R_BRACKET => ErrorCode::E0202,
            _ => ErrorCode::E0203,
        };
        Err(self
            .error(code, self.current_range())
            .message(context_message(self.current().describe(), context))
            .hint(format!("add {} to close it", closing.describe()))
            .related("opened here", open)
            .build()
            .into())
    }

    // ------------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------------

    fn connect(
        &mut self,
        from: &[FactorId],
        to: &[FactorId],
        kind: RelationKind,
        op: TextRange,
    ) -> Result<(), ParseError> {
        trace!(op = kind.operator(), from = from.len(), to = to.len(), "apply operator");
        for &f in from {
            for &t in to {
                match self.design.relate(f, t, kind) {
                    Ok(()) => {}
                    Err(DesignError::SelfLoop(name)) => {
                        return Err(self
                            .error(ErrorCode::E0502, op)
                            .message(format!(
                                "'{name}' cannot be related to itself with '{}'",
                                kind.operator()
                            ))
                            .build()
                            .into());
                    }
                    Err(other) => {
                        return Err(self
                            .error(ErrorCode::E0999, op)
                            .message(other.to_string())
                            .build()
                            .into());
                    }
                }
            }
        }
        Ok(())
    }

    fn flush_classifications(&mut self) -> Result<(), ParseError> {
        let pending = std::mem::take(&mut self.deferred);
        // Collected innermost first; emit outermost first.
        for d in pending.into_iter().rev() {
            self.connect(&[d.subject], &[d.classifier], RelationKind::Classifies, d.op)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------------

    fn parse_document(&mut self) -> Result<(), ParseError> {
        while !self.at(SyntaxKind::EOF) {
            if !self.current().starts_primary() {
                return Err(self.unexpected(ParseContext::TopLevel));
            }
            // Expressions are separated by line breaks.
            if self.pos > 0 && !self.at_line_start() {
                return Err(self.unexpected(ParseContext::ExpressionEnd));
            }
            self.declared.clear();
            let expr = self.parse_confounding(ParseContext::TopLevel)?;
            self.flush_classifications()?;
            self.expressions += 1;
            trace!(
                heads = expr.heads.len(),
                tails = expr.tails.len(),
                "parsed expression"
            );
        }
        Ok(())
    }

    fn parse_confounding(&mut self, context: ParseContext) -> Result<Operand, ParseError> {
        let mut left = self.parse_batch(context)?;
        let mut members: Vec<FactorId> = Vec::new();
        while matches!(
            self.current(),
            SyntaxKind::APPROX_APPROX | SyntaxKind::TILDE_TILDE
        ) {
            let op_text = self.current_text();
            let op = self.bump();
            if left.classified {
                return Err(self.classified_error(op, op_text));
            }
            let right = self.parse_batch(ParseContext::Operand)?;
            if members.is_empty() {
                members.extend_from_slice(&left.tails);
            }
            union(&mut members, &right.heads);
            if members.len() > self.options.max_group_size {
                return Err(self.limit(
                    "confound group size",
                    self.options.max_group_size,
                    members.len(),
                    op,
                ));
            }
            self.connect(&left.tails, &right.heads, RelationKind::Confounded, op)?;
            left = left.merge(right);
        }
        if !members.is_empty() {
            self.design.record_confound_group(members);
        }
        Ok(left)
    }

    fn parse_batch(&mut self, context: ParseContext) -> Result<Operand, ParseError> {
        let mut left = self.parse_crossing(context)?;
        while self.at(SyntaxKind::EQ_EQ) {
            let op_text = self.current_text();
            let op = self.bump();
            if left.classified {
                return Err(self.classified_error(op, op_text));
            }
            if let Some(&earlier) = left.tails.iter().find(|id| !self.declared.contains(*id)) {
                return Err(self
                    .error(ErrorCode::E0501, op)
                    .message(format!(
                        "'{}' was declared by an earlier expression and cannot become a batch factor here",
                        self.design.name_of(earlier)
                    ))
                    .hint("use Design::add_batch_effect to attach a batch effect to existing factors")
                    .build()
                    .into());
            }
            let right = self.parse_crossing(ParseContext::Operand)?;
            for &id in &left.tails {
                self.design.mark_batch(id);
            }
            self.connect(&left.tails, &right.heads, RelationKind::BatchEffect, op)?;
            left = left.merge(right);
        }
        Ok(left)
    }

    fn crossing_kind(&self) -> Option<RelationKind> {
        self.current()
            .relation()
            .filter(|k| matches!(k, RelationKind::Crosses | RelationKind::PartialCrosses))
    }

    fn parse_crossing(&mut self, context: ParseContext) -> Result<Operand, ParseError> {
        let first = self.parse_nesting(context)?;
        if self.crossing_kind().is_none() {
            return Ok(first.into_operand());
        }

        let mut heads = first.first.heads.clone();
        let mut group = first.last().tails.clone();
        let mut classified = first.last().classified;
        let mut range = first.range();

        while let Some(kind) = self.crossing_kind() {
            let op_text = self.current_text();
            let op = self.bump();
            if classified {
                return Err(self.classified_error(op, op_text));
            }
            let chain = self.parse_nesting(ParseContext::Operand)?;
            let level0 = &chain.first;
            self.connect(&group, &level0.heads, kind, op)?;

            let before = group.clone();
            union(&mut group, &level0.tails);

            // Crossed partners of the first level nest into the second.
            if let Some(next) = chain.rest.first() {
                let outside: Vec<FactorId> = before
                    .into_iter()
                    .filter(|id| !level0.tails.contains(id))
                    .collect();
                self.connect(&outside, &next.heads, RelationKind::Nests, op)?;
                group = chain.last().tails.clone();
            }

            union(&mut heads, &level0.heads);
            classified = chain.last().classified;
            range = range.cover(chain.range());
        }

        Ok(Operand {
            heads,
            tails: group,
            classified,
            range,
        })
    }

    fn parse_nesting(&mut self, context: ParseContext) -> Result<Chain, ParseError> {
        let first = self.parse_classification(context)?;
        let mut chain = Chain {
            first,
            rest: Vec::new(),
        };
        while self.at(SyntaxKind::GT) {
            let op_text = self.current_text();
            let op = self.bump();
            if chain.last().classified {
                return Err(self.classified_error(op, op_text));
            }
            let right = self.parse_classification(ParseContext::Operand)?;
            let tails = chain.last().tails.clone();
            self.connect(&tails, &right.heads, RelationKind::Nests, op)?;
            chain.rest.push(right);
        }
        Ok(chain)
    }

    fn parse_classification(&mut self, context: ParseContext) -> Result<Operand, ParseError> {
        let subject = self.parse_primary(context)?;
        if !self.at(SyntaxKind::COLON) {
            return Ok(subject);
        }
        let op_text = self.current_text();
        let op = self.bump();
        if subject.classified {
            return Err(self.classified_error(op, op_text));
        }

        self.enter(op)?;
        let classifier = self.parse_classification(ParseContext::Operand)?;
        self.leave();

        for &s in &subject.tails {
            for &c in &classifier.heads {
                self.deferred.push(Deferred {
                    subject: s,
                    classifier: c,
                    op,
                });
            }
        }
        Ok(Operand {
            classified: true,
            range: subject.range.cover(classifier.range),
            ..subject
        })
    }

    fn parse_primary(&mut self, context: ParseContext) -> Result<Operand, ParseError> {
        match self.current() {
            SyntaxKind::IDENT => self.parse_factor(),
            SyntaxKind::L_BRACE => self.parse_group(),
            SyntaxKind::L_PAREN => {
                let open = self.bump();
                self.enter(open)?;
                let inner = self.parse_confounding(ParseContext::Parenthesized)?;
                let close = self.expect_closing(SyntaxKind::R_PAREN, open, ParseContext::Parenthesized)?;
                self.leave();
                Ok(Operand {
                    range: open.cover(close),
                    ..inner
                })
            }
            _ => Err(self.unexpected(context)),
        }
    }

    /// A factor occurrence: a declaration on first mention, a reference
    /// afterwards.
    fn parse_factor(&mut self) -> Result<Operand, ParseError> {
        let (id, range) = self.parse_factor_id()?;
        Ok(Operand::single(id, range))
    }

    fn parse_factor_id(&mut self) -> Result<(FactorId, TextRange), ParseError> {
        let name = self.current_text();
        let name_range = self.bump();
        let existing = self.design.factor_id(name);

        let size = match self.current() {
            // A known name followed by `(` that does not start a count is a
            // reference followed by a new parenthesized expression.
            SyntaxKind::L_PAREN
                if existing.is_none()
                    || matches!(self.nth(1), SyntaxKind::NUMBER | SyntaxKind::TILDE) =>
            {
                Some(self.parse_count_size()?)
            }
            SyntaxKind::L_BRACKET => Some(self.parse_branch_size()?),
            _ => None,
        };
        let range = name_range.cover(self.previous_range());

        match (existing, size) {
            (Some(id), None) => Ok((id, range)),
            (Some(id), Some(size)) => {
                let declared = self.design.get(id).map(|f| f.size.clone());
                if declared.as_ref() != Some(&size) {
                    let previous = declared.map_or_else(String::new, |s| s.to_string());
                    return Err(self
                        .error(ErrorCode::E0303, range)
                        .message(format!(
                            "conflicting size for '{name}': declared as {previous}, found {size}"
                        ))
                        .hint(format!("refer to an existing factor by name alone: {name}"))
                        .build()
                        .into());
                }
                Ok((id, range))
            }
            (None, None) => Err(self
                .error(ErrorCode::E0301, name_range)
                .message(format!("missing size specification for '{name}'"))
                .hint(format!("write {name}(n), {name}(~n) or {name}[n1|n2]"))
                .build()
                .into()),
            (None, Some(size)) => match self.design.add_factor(name, size, FactorKind::Factor) {
                Ok(id) => {
                    self.declared.insert(id);
                    Ok((id, range))
                }
                Err(err) => Err(self
                    .error(ErrorCode::E0302, range)
                    .message(err.to_string())
                    .build()
                    .into()),
            },
        }
    }

    /// `( n )` or `( ~n )`
    fn parse_count_size(&mut self) -> Result<FactorSize, ParseError> {
        let open = self.bump();
        let approximate = self.at(SyntaxKind::TILDE);
        if approximate {
            self.bump();
        }
        let n = self.parse_count(ParseContext::Size)?;
        self.expect_closing(SyntaxKind::R_PAREN, open, ParseContext::Size)?;
        Ok(if approximate {
            FactorSize::Approximate(n)
        } else {
            FactorSize::Exact(n)
        })
    }

    /// `[ n1 | n2 | ... ]`
    fn parse_branch_size(&mut self) -> Result<FactorSize, ParseError> {
        let open = self.bump();
        if self.at(SyntaxKind::R_BRACKET) {
            let close = self.bump();
            return Err(self
                .error(ErrorCode::E0304, open.cover(close))
                .message("unbalanced size needs at least one branch count")
                .build()
                .into());
        }
        let mut branches = vec![self.parse_count(ParseContext::UnbalancedSize)?];
        while self.at(SyntaxKind::PIPE) {
            let pipe = self.bump();
            branches.push(self.parse_count(ParseContext::UnbalancedSize)?);
            if branches.len() > self.options.max_group_size {
                return Err(self.limit(
                    "branch count",
                    self.options.max_group_size,
                    branches.len(),
                    pipe,
                ));
            }
        }
        self.expect_closing(SyntaxKind::R_BRACKET, open, ParseContext::UnbalancedSize)?;
        Ok(FactorSize::Unbalanced(branches))
    }

    /// A positive count with an optional `k` suffix.
    fn parse_count(&mut self, context: ParseContext) -> Result<u64, ParseError> {
        if !self.at(SyntaxKind::NUMBER) {
            return Err(self
                .error(ErrorCode::E0902, self.current_range())
                .message(context_message(self.current().describe(), context))
                .build()
                .into());
        }
        let text = self.current_text();
        let range = self.bump();

        let (digits, scale) = match text.strip_suffix('k') {
            Some(digits) => (digits, 1000u64),
            None => (text, 1),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self
                .error(ErrorCode::E0103, range)
                .message(format!("malformed number '{text}'"))
                .hint("write digits with an optional k suffix, e.g. 40 or 5k")
                .build()
                .into());
        }
        let value = digits
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(scale))
            .ok_or_else(|| -> ParseError {
                self.error(ErrorCode::E0104, range)
                    .message(format!("number '{text}' is too large"))
                    .build()
                    .into()
            })?;
        if value == 0 {
            return Err(self
                .error(ErrorCode::E0302, range)
                .message("size must be positive")
                .build()
                .into());
        }
        Ok(value)
    }

    /// `{ A(n) ≈≈ B(m) ≈≈ ... }`
    fn parse_group(&mut self) -> Result<Operand, ParseError> {
        let open = self.bump();
        self.enter(open)?;

        let mut members = vec![self.parse_group_member()?];
        while matches!(
            self.current(),
            SyntaxKind::APPROX_APPROX | SyntaxKind::TILDE_TILDE
        ) {
            let op = self.bump();
            members.push(self.parse_group_member()?);
            if members.len() > self.options.max_group_size {
                return Err(self.limit(
                    "confound group size",
                    self.options.max_group_size,
                    members.len(),
                    op,
                ));
            }
        }
        if let Some(kind) = self.current().relation() {
            return Err(self
                .error(ErrorCode::E0306, self.current_range())
                .message(format!(
                    "{} is not allowed inside a confound group",
                    self.current().describe()
                ))
                .hint(format!(
                    "apply '{}' outside the braces",
                    kind.operator()
                ))
                .build()
                .into());
        }
        let close = self.expect_closing(SyntaxKind::R_BRACE, open, ParseContext::ConfoundGroup)?;
        self.leave();
        let range = open.cover(close);

        if members.len() < 2 {
            return Err(self
                .error(ErrorCode::E0305, range)
                .message("a confound group needs at least two factors")
                .hint("write {A(n) ≈≈ B(m)}")
                .build()
                .into());
        }

        for j in 1..members.len() {
            for i in 0..j {
                self.connect(&[members[i]], &[members[j]], RelationKind::Confounded, range)?;
            }
        }
        self.design.record_confound_group(members.clone());

        Ok(Operand {
            heads: members.clone(),
            tails: members,
            classified: false,
            range,
        })
    }

    fn parse_group_member(&mut self) -> Result<FactorId, ParseError> {
        if !self.at(SyntaxKind::IDENT) {
            return Err(self
                .error(ErrorCode::E0306, self.current_range())
                .message(format!(
                    "confound group members must be factors, found {}",
                    self.current().describe()
                ))
                .build()
                .into());
        }
        let (id, _) = self.parse_factor_id()?;
        Ok(id)
    }
}
