use std::io::{BufRead, Write};

use lazy_static::lazy_static;
use regex::Regex;

use crate::builtins;
use crate::env::{Env, FunctionEntry};
use crate::error::{map_io_error, CrimsonError, CrimsonResult};
use crate::lexer::{Token, TokenKind};
use crate::value::{self, DataType, Variable};

lazy_static! {
    static ref RE_INCLUDE: Regex = Regex::new(r"^#include\s*<([^>]*)>").unwrap();
}

/// Combined parser/executor over one token sequence. There is no syntax
/// tree: the cursor is the only parse state, and every dispatch arm both
/// recognizes and runs its statement. The cursor advances monotonically
/// except for the single reset onto the entry block after resolution.
pub struct Interpreter<'io, R: BufRead, W: Write> {
    tokens: Vec<Token>,
    cursor: usize,
    env: Env,
    input: &'io mut R,
    output: &'io mut W,
}

impl<'io, R: BufRead, W: Write> Interpreter<'io, R, W> {
    pub fn new(tokens: Vec<Token>, input: &'io mut R, output: &'io mut W) -> Self {
        Self {
            tokens,
            cursor: 0,
            env: Env::new(),
            input,
            output,
        }
    }

    /// Resolve the entry block, then execute statements between its bounds.
    pub fn run(&mut self) -> CrimsonResult<()> {
        let (entry_start, entry_end) = self.resolve_entry()?;
        self.cursor = entry_start;
        while self.cursor < self.tokens.len()
            && self.cursor <= entry_end
            && self.tokens[self.cursor].kind != TokenKind::Eof
        {
            self.dispatch()?;
        }
        Ok(())
    }

    /// Locate `void main()` / `int main()` and validate structure before
    /// anything executes: the block must close, and no built-in may be named
    /// outside it.
    fn resolve_entry(&self) -> CrimsonResult<(usize, usize)> {
        let mut entry_start = None;
        for (i, token) in self.tokens.iter().enumerate() {
            if token.kind == TokenKind::Keyword
                && (token.text == "void" || token.text == "int")
                && self.text_at(i + 1) == "main"
            {
                entry_start = Some(i);
                break;
            }
        }
        let entry_start = entry_start.ok_or(CrimsonError::NoEntryFunction)?;

        let mut depth = 0i32;
        let mut in_entry = false;
        let mut entry_end = 0;
        for i in entry_start..self.tokens.len() {
            if self.tokens[i].text == "main" && self.text_at(i + 1) == "(" {
                in_entry = true;
                continue;
            }
            if in_entry {
                match self.tokens[i].text.as_str() {
                    "{" => depth += 1,
                    "}" => {
                        depth -= 1;
                        if depth == 0 {
                            entry_end = i;
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        if entry_end == 0 {
            return Err(CrimsonError::UnclosedEntryBlock);
        }

        for (i, token) in self.tokens.iter().enumerate() {
            if (i < entry_start || i > entry_end)
                && token.kind == TokenKind::Identifier
                && builtins::is_builtin(&token.text)
            {
                return Err(CrimsonError::CodeOutsideEntry { line: token.line });
            }
        }

        Ok((entry_start, entry_end))
    }

    /// The statement dispatch table, shared by the top level and nested
    /// blocks. Unrecognized tokens fall through one position with no effect.
    fn dispatch(&mut self) -> CrimsonResult<()> {
        let (kind, text) = match self.tokens.get(self.cursor) {
            Some(token) => (token.kind, token.text.clone()),
            None => return Ok(()),
        };
        match kind {
            TokenKind::Comment => {
                self.cursor += 1;
                Ok(())
            }
            TokenKind::Keyword if text.starts_with("#include") => self.include_directive(&text),
            TokenKind::Keyword if matches!(text.as_str(), "int" | "float" | "bool" | "string") => {
                self.variable_declaration();
                Ok(())
            }
            TokenKind::Keyword if text == "void" => {
                self.function_declaration();
                Ok(())
            }
            TokenKind::Keyword if text == "if" => self.if_statement(),
            TokenKind::Identifier => self.call_statement(),
            _ => {
                self.cursor += 1;
                Ok(())
            }
        }
    }

    /// Import acknowledgment: the whole directive is one keyword token, so
    /// the library name is pulled from its text. No namespace effect.
    fn include_directive(&mut self, directive: &str) -> CrimsonResult<()> {
        self.cursor += 1;
        if let Some(caps) = RE_INCLUDE.captures(directive) {
            writeln!(self.output, "Including library: {}", &caps[1]).map_err(map_io_error)?;
        }
        Ok(())
    }

    /// `int|float|bool|string name [= expr] [;]`. Without a trailing
    /// identifier the consumed type keyword is simply lost.
    fn variable_declaration(&mut self) {
        let ty = DataType::from_keyword(&self.tokens[self.cursor].text);
        self.cursor += 1;

        if self.kind_at(self.cursor) != Some(TokenKind::Identifier) {
            return;
        }
        let name = self.tokens[self.cursor].text.clone();
        self.cursor += 1;

        let variable = if self.text_at(self.cursor) == "=" {
            self.cursor += 1;
            let text = self.expression();
            Variable::new(ty, text)
        } else {
            Variable::new(ty, ty.default_value())
        };
        self.env.set_var(name, variable);

        if self.text_at(self.cursor) == ";" {
            self.cursor += 1;
        }
    }

    /// `void name(params) { ... }`. Only identifier tokens survive as
    /// parameter names; the body is captured verbatim and never executed.
    fn function_declaration(&mut self) {
        self.cursor += 1; // void

        if self.kind_at(self.cursor) != Some(TokenKind::Identifier) {
            return;
        }
        let name = self.tokens[self.cursor].text.clone();
        self.cursor += 1;

        if self.text_at(self.cursor) != "(" {
            return;
        }
        self.cursor += 1;

        let mut params = Vec::new();
        while self.cursor < self.tokens.len() && self.text_at(self.cursor) != ")" {
            if self.tokens[self.cursor].kind == TokenKind::Identifier {
                params.push(self.tokens[self.cursor].text.clone());
            }
            self.cursor += 1;
        }
        if self.text_at(self.cursor) == ")" {
            self.cursor += 1;
        }

        if self.text_at(self.cursor) != "{" {
            return;
        }
        self.cursor += 1;

        let mut body = Vec::new();
        let mut depth = 1i32;
        while self.cursor < self.tokens.len() && depth > 0 {
            match self.text_at(self.cursor) {
                "{" => depth += 1,
                "}" => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                body.push(self.tokens[self.cursor].clone());
                self.cursor += 1;
            }
        }
        if self.text_at(self.cursor) == "}" {
            self.cursor += 1;
        }

        self.env.define_func(
            name,
            FunctionEntry {
                return_type: DataType::Void,
                params,
                body,
            },
        );
    }

    /// `name(arg, ...) [;]`: collect arguments, then route through built-in
    /// dispatch. An identifier without `(` is consumed with no effect.
    fn call_statement(&mut self) -> CrimsonResult<()> {
        let name = self.tokens[self.cursor].text.clone();
        self.cursor += 1;

        if self.text_at(self.cursor) != "(" {
            return Ok(());
        }
        self.cursor += 1;

        let mut args = Vec::new();
        while self.cursor < self.tokens.len() && self.text_at(self.cursor) != ")" {
            let token = &self.tokens[self.cursor];
            match token.kind {
                TokenKind::String | TokenKind::Number => args.push(token.text.clone()),
                TokenKind::Identifier => {
                    let resolved = self
                        .env
                        .get_var(&token.text)
                        .map(|v| v.value.clone())
                        .unwrap_or_else(|| token.text.clone());
                    args.push(resolved);
                }
                // Commas separate; anything else is skipped.
                _ => {}
            }
            self.cursor += 1;
        }
        if self.text_at(self.cursor) == ")" {
            self.cursor += 1;
        }

        builtins::dispatch(&name, &args, &self.env, &mut *self.input, &mut *self.output)?;

        if self.text_at(self.cursor) == ";" {
            self.cursor += 1;
        }
        Ok(())
    }

    /// `if (cond) {..} [else if (cond) {..}]* [else {..}]` with single-branch
    /// selection: the first true condition claims the chain and every later
    /// clause is skipped regardless of its own condition.
    fn if_statement(&mut self) -> CrimsonResult<()> {
        self.cursor += 1; // if

        if self.text_at(self.cursor) != "(" {
            return Ok(());
        }
        self.cursor += 1;

        let condition = self.condition()?;
        let mut claimed = false;

        if self.text_at(self.cursor) != ")" {
            return Ok(());
        }
        self.cursor += 1;

        if self.text_at(self.cursor) != "{" {
            return Ok(());
        }
        self.cursor += 1;

        if condition {
            self.execute_block()?;
            claimed = true;
        } else {
            self.skip_block();
        }

        while self.keyword_at(self.cursor, "else") {
            self.cursor += 1; // else

            if self.text_at(self.cursor) == "if" {
                self.cursor += 1;
                if self.text_at(self.cursor) == "(" {
                    self.cursor += 1;
                    let branch_condition = self.condition()?;
                    if self.text_at(self.cursor) == ")" {
                        self.cursor += 1;
                        if self.text_at(self.cursor) == "{" {
                            self.cursor += 1;
                            if !claimed && branch_condition {
                                self.execute_block()?;
                                claimed = true;
                            } else {
                                self.skip_block();
                            }
                        }
                    }
                }
            } else if self.text_at(self.cursor) == "{" {
                self.cursor += 1;
                if !claimed {
                    self.execute_block()?;
                } else {
                    self.skip_block();
                }
                break; // a bare else is always the chain's final clause
            }
        }
        Ok(())
    }

    /// Run statements up to the matching close brace, re-entering the
    /// dispatch table for each one, and consume the brace.
    fn execute_block(&mut self) -> CrimsonResult<()> {
        let mut depth = 1i32;
        while self.cursor < self.tokens.len() && depth > 0 {
            match self.text_at(self.cursor) {
                "{" => depth += 1,
                "}" => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.dispatch()?;
            }
        }
        if self.text_at(self.cursor) == "}" {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Discard tokens up to and including the matching close brace with no
    /// evaluation or side effects.
    fn skip_block(&mut self) {
        let mut depth = 1i32;
        while self.cursor < self.tokens.len() && depth > 0 {
            match self.text_at(self.cursor) {
                "{" => depth += 1,
                "}" => depth -= 1,
                _ => {}
            }
            self.cursor += 1;
        }
    }

    /// Single-operand expression: literal text, or an identifier resolved
    /// through the variable table (falling back to its own name). Any other
    /// token yields an empty string without being consumed.
    fn expression(&mut self) -> String {
        let token = match self.tokens.get(self.cursor) {
            Some(token) => token,
            None => return String::new(),
        };
        match token.kind {
            TokenKind::String | TokenKind::Number => {
                let text = token.text.clone();
                self.cursor += 1;
                text
            }
            TokenKind::Identifier => {
                let name = token.text.clone();
                self.cursor += 1;
                self.env
                    .get_var(&name)
                    .map(|v| v.value.clone())
                    .unwrap_or(name)
            }
            TokenKind::Keyword if token.text == "true" || token.text == "false" => {
                let text = token.text.clone();
                self.cursor += 1;
                text
            }
            _ => String::new(),
        }
    }

    /// One expression, optionally followed by an operator and a second
    /// expression. Without an operator the single value's truthiness decides.
    fn condition(&mut self) -> CrimsonResult<bool> {
        if self.cursor >= self.tokens.len() {
            return Ok(false);
        }
        let left = self.expression();
        if self.cursor >= self.tokens.len() {
            return Ok(false);
        }

        let operator = if self.tokens[self.cursor].kind == TokenKind::Operator {
            let text = self.tokens[self.cursor].text.clone();
            self.cursor += 1;
            Some(text)
        } else {
            None
        };

        match operator {
            None => Ok(value::is_truthy(&left)),
            Some(op) => {
                let right = self.expression();
                compare(&left, &op, &right)
            }
        }
    }

    fn text_at(&self, index: usize) -> &str {
        self.tokens.get(index).map(|t| t.text.as_str()).unwrap_or("")
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    fn keyword_at(&self, index: usize, word: &str) -> bool {
        self.tokens
            .get(index)
            .map(|t| t.kind == TokenKind::Keyword && t.text == word)
            .unwrap_or(false)
    }
}

/// `==`/`!=` compare raw text; the ordered operators compare numerically and
/// fault on a non-numeric operand. Unrecognized operators compare false.
fn compare(left: &str, op: &str, right: &str) -> CrimsonResult<bool> {
    match op {
        "==" => Ok(left == right),
        "!=" => Ok(left != right),
        "<" | ">" | "<=" | ">=" => {
            let lhs = parse_numeric(left)?;
            let rhs = parse_numeric(right)?;
            Ok(match op {
                "<" => lhs < rhs,
                ">" => lhs > rhs,
                "<=" => lhs <= rhs,
                _ => lhs >= rhs,
            })
        }
        _ => Ok(false),
    }
}

fn parse_numeric(text: &str) -> CrimsonResult<f64> {
    text.parse().map_err(|_| CrimsonError::NonNumericOperand {
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use std::io::Cursor;

    fn run(source: &str) -> CrimsonResult<String> {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let result = {
            let mut interp = Interpreter::new(tokenize(source), &mut input, &mut output);
            interp.run()
        };
        result.map(|_| String::from_utf8(output).expect("utf-8 output"))
    }

    #[test]
    fn compare_equality_is_textual() {
        assert!(compare("\"hi\"", "==", "\"hi\"").unwrap());
        assert!(compare("5", "!=", "5.0").unwrap());
        assert!(!compare("5", "==", "5.0").unwrap());
    }

    #[test]
    fn compare_ordering_is_numeric() {
        assert!(compare("3", "<", "5").unwrap());
        assert!(compare("5.5", ">=", "5.5").unwrap());
        assert!(!compare("10", "<=", "9.9").unwrap());
    }

    #[test]
    fn compare_non_numeric_faults() {
        let err = compare("\"hi\"", "<", "5").unwrap_err();
        assert_eq!(
            err,
            CrimsonError::NonNumericOperand {
                text: "\"hi\"".to_string()
            }
        );
    }

    #[test]
    fn compare_unknown_operator_is_false() {
        assert!(!compare("true", "&&", "true").unwrap());
    }

    #[test]
    fn missing_entry_is_fatal() {
        assert_eq!(run("int x = 5;"), Err(CrimsonError::NoEntryFunction));
    }

    #[test]
    fn unclosed_entry_is_fatal() {
        assert_eq!(
            run("void main() { crym(\"hi\");"),
            Err(CrimsonError::UnclosedEntryBlock)
        );
    }

    #[test]
    fn builtin_outside_entry_is_fatal_and_names_the_line() {
        let source = "void main() {\n}\ncrym(\"outside\");\n";
        assert_eq!(run(source), Err(CrimsonError::CodeOutsideEntry { line: 3 }));
    }

    #[test]
    fn entry_resolution_failure_produces_no_output() {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let tokens = tokenize("crym(\"hi\");\nvoid main() { crym(\"hi\");");
        let mut interp = Interpreter::new(tokens, &mut input, &mut output);
        assert!(interp.run().is_err());
        assert!(output.is_empty());
    }
}
