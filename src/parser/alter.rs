//! Recursive-descent parser for MySQL ALTER TABLE statements.

use super::lexer::{Lexer, Spanned, Token};
use crate::meta::{ActionDetail, ActionKind, AlterAction, AlterOperation, GeneratedKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("no ALTER TABLE statements found")]
    NoAlterStatements,
    #[error("no supported ALTER actions found in statement: {0}")]
    NoSupportedActions(String),
    #[error("Expected {expected}, found {found}")]
    Expected { expected: String, found: String },
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Parse a script into its ALTER TABLE operations. Other statements are skipped.
pub fn parse(sql: &str) -> Result<Vec<AlterOperation>, ParseError> {
    let tokens = Lexer::new(sql).tokenize();
    let mut parser = Parser::new(sql, tokens);
    let operations = parser.parse()?;
    if operations.is_empty() {
        return Err(ParseError::NoAlterStatements);
    }
    Ok(operations)
}

/// Parsed column definition
#[derive(Debug, Default)]
struct ColumnDef {
    name: String,
    column_type: String,
    not_null: bool,
    default_value: Option<String>,
    auto_increment: bool,
    generated: Option<GeneratedKind>,
}

impl ColumnDef {
    fn into_detail(self, position: String) -> ActionDetail {
        ActionDetail {
            column_name: self.name,
            column_type: self.column_type,
            is_nullable: Some(!self.not_null),
            default_value: self.default_value,
            position,
            is_auto_increment: self.auto_increment,
            generated_type: self.generated,
            ..Default::default()
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Spanned>) -> Self {
        Self { source, tokens, pos: 0 }
    }

    // ===== TOKEN CURSOR =====

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).map(|s| &s.token).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_word(&self, keyword: &str) -> bool {
        self.current().is_word(keyword)
    }

    /// Consume `keyword` if it is next
    fn eat_word(&mut self, keyword: &str) -> bool {
        if self.at_word(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expected(&self, expected: &str) -> ParseError {
        match self.current() {
            Token::Eof => ParseError::UnexpectedEof,
            found => ParseError::Expected {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        }
    }

    fn expect_word(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_word(keyword) {
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.expected(&token.to_string()))
        }
    }

    /// End of the current statement (not consumed)
    fn at_statement_end(&self) -> bool {
        matches!(self.current(), Token::Semicolon | Token::Eof)
    }

    /// End of the current ALTER specification (not consumed)
    fn at_spec_end(&self) -> bool {
        self.at_statement_end() || self.current() == &Token::Comma
    }

    fn skip_statement(&mut self) {
        while !self.at_statement_end() {
            self.advance();
        }
    }

    /// Skip a balanced parenthesised group starting at `(`
    fn skip_group(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LParen)?;
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// Skip to the end of the current specification, stepping over groups
    fn skip_spec(&mut self) -> Result<(), ParseError> {
        while !self.at_spec_end() {
            if self.current() == &Token::LParen {
                self.skip_group()?;
            } else {
                self.advance();
            }
        }
        Ok(())
    }

    /// Identifier, lower-cased
    fn identifier(&mut self) -> Result<String, ParseError> {
        let name = match self.current() {
            Token::Word(w) => w.to_lowercase(),
            Token::Quoted(q) => q.to_lowercase(),
            _ => return Err(self.expected("identifier")),
        };
        self.advance();
        Ok(name)
    }

    /// `[schema.]table`
    fn table_name(&mut self) -> Result<(String, String), ParseError> {
        let first = self.identifier()?;
        if self.eat(&Token::Dot) {
            let table = self.identifier()?;
            Ok((first, table))
        } else {
            Ok((String::new(), first))
        }
    }

    /// `( col [(len)] [ASC|DESC], ... )`
    fn column_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            if self.current() == &Token::LParen {
                // functional key part
                self.skip_group()?;
            } else {
                columns.push(self.identifier()?);
                if self.current() == &Token::LParen {
                    self.skip_group()?;
                }
            }
            let _ = self.eat_word("ASC") || self.eat_word("DESC");
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(columns)
    }

    /// `[=] value`, returned as text
    fn option_value(&mut self) -> Result<String, ParseError> {
        self.eat(&Token::Eq);
        let value = match self.current() {
            Token::Word(w) => w.clone(),
            Token::Quoted(q) | Token::Str(q) => q.clone(),
            Token::Num(n) => n.clone(),
            _ => return Err(self.expected("option value")),
        };
        self.advance();
        Ok(value)
    }

    fn source_between(&self, start: usize, end: usize) -> String {
        self.source.get(start..end).unwrap_or_default().trim().to_string()
    }

    // ===== STATEMENTS =====

    fn parse(&mut self) -> Result<Vec<AlterOperation>, ParseError> {
        let mut operations = Vec::new();
        while self.current() != &Token::Eof {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            if self.is_alter_table() {
                operations.push(self.alter_table()?);
            } else {
                self.skip_statement();
            }
        }
        Ok(operations)
    }

    fn is_alter_table(&self) -> bool {
        if !self.at_word("ALTER") {
            return false;
        }
        let mut offset = 1;
        while self.peek_at(offset).is_word("ONLINE") || self.peek_at(offset).is_word("IGNORE") {
            offset += 1;
        }
        self.peek_at(offset).is_word("TABLE")
    }

    fn alter_table(&mut self) -> Result<AlterOperation, ParseError> {
        let start = self.tokens.get(self.pos).map(|s| s.start).unwrap_or_default();
        self.expect_word("ALTER")?;
        while self.eat_word("ONLINE") || self.eat_word("IGNORE") {}
        self.expect_word("TABLE")?;
        let (schema, table) = self.table_name()?;

        let mut actions = Vec::new();
        while !self.at_statement_end() {
            actions.extend(self.specification()?);
            if !self.eat(&Token::Comma) && !self.at_statement_end() {
                // Partition options follow the spec list without a comma
                if !(self.at_word("PARTITION") || self.at_word("REMOVE")) {
                    return Err(self.expected("',' or end of statement"));
                }
            }
        }

        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map(|s| s.end)
            .unwrap_or(start);
        let raw_sql = self.source_between(start, end);

        if actions.is_empty() {
            return Err(ParseError::NoSupportedActions(raw_sql));
        }
        Ok(AlterOperation {
            schema,
            table,
            actions,
            raw_sql,
        })
    }

    /// One comma-separated ALTER specification. May yield zero actions
    /// (ALGORITHM=, LOCK=, COMMENT= ...) or several (ADD COLUMN (a, b)).
    fn specification(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        let keyword = match self.current() {
            Token::Word(w) => w.to_ascii_uppercase(),
            _ => return Err(self.expected("ALTER specification")),
        };

        match keyword.as_str() {
            "ADD" => {
                self.advance();
                self.add_spec()
            }
            "DROP" => {
                self.advance();
                self.drop_spec()
            }
            "MODIFY" => {
                self.advance();
                self.eat_word("COLUMN");
                let column = self.column_definition()?;
                let position = self.position()?;
                Ok(vec![AlterAction::with_detail(
                    ActionKind::ModifyColumn,
                    column.into_detail(position),
                )])
            }
            "CHANGE" => {
                self.advance();
                self.eat_word("COLUMN");
                let old_name = self.identifier()?;
                let column = self.column_definition()?;
                let position = self.position()?;
                let mut detail = column.into_detail(position);
                detail.old_column_name = old_name;
                Ok(vec![AlterAction::with_detail(ActionKind::ChangeColumn, detail)])
            }
            "RENAME" => {
                self.advance();
                self.rename()
            }
            "ALTER" => {
                self.advance();
                self.alter_column()
            }
            "ENGINE" => {
                self.advance();
                let engine = self.option_value()?;
                Ok(vec![AlterAction::with_detail(
                    ActionKind::ChangeEngine,
                    ActionDetail {
                        engine,
                        ..Default::default()
                    },
                )])
            }
            "DEFAULT" | "CHARACTER" | "CHARSET" => self.specify_charset(),
            "CONVERT" => {
                self.advance();
                self.expect_word("TO")?;
                let charset = self.charset_clause()?;
                self.skip_collate()?;
                Ok(vec![AlterAction::with_detail(
                    ActionKind::ConvertCharacterSet,
                    ActionDetail {
                        charset,
                        ..Default::default()
                    },
                )])
            }
            "ROW_FORMAT" => {
                self.advance();
                let row_format = self.option_value()?.to_ascii_uppercase();
                Ok(vec![AlterAction::with_detail(
                    ActionKind::ChangeRowFormat,
                    ActionDetail {
                        row_format,
                        ..Default::default()
                    },
                )])
            }
            "KEY_BLOCK_SIZE" => self.table_option(ActionKind::ChangeKeyBlockSize),
            "AUTO_INCREMENT" => self.table_option(ActionKind::ChangeAutoIncrement),
            "STATS_PERSISTENT" | "STATS_AUTO_RECALC" | "STATS_SAMPLE_PAGES" => {
                self.table_option(ActionKind::SetTableStats)
            }
            "ENCRYPTION" => self.table_option(ActionKind::TableEncryption),
            "FORCE" => {
                self.advance();
                Ok(vec![AlterAction::new(ActionKind::ForceRebuild)])
            }
            "ALGORITHM" | "LOCK" => {
                self.advance();
                self.option_value()?;
                Ok(Vec::new())
            }
            "COALESCE" => self.partition_clause(ActionKind::CoalescePartition),
            "REORGANIZE" => self.partition_clause(ActionKind::ReorganizePartition),
            "TRUNCATE" => self.partition_clause(ActionKind::TruncatePartition),
            "REBUILD" => self.partition_clause(ActionKind::RebuildPartition),
            "EXCHANGE" => self.partition_clause(ActionKind::ExchangePartition),
            "OPTIMIZE" => self.partition_clause(ActionKind::OptimizePartition),
            "REPAIR" => self.partition_clause(ActionKind::RepairPartition),
            "CHECK" if self.peek_at(1).is_word("PARTITION") => {
                self.partition_clause(ActionKind::CheckPartition)
            }
            "DISCARD" if self.peek_at(1).is_word("PARTITION") => {
                self.partition_clause(ActionKind::DiscardPartitionTablespace)
            }
            "IMPORT" if self.peek_at(1).is_word("PARTITION") => {
                self.partition_clause(ActionKind::ImportPartitionTablespace)
            }
            "REMOVE" => {
                self.advance();
                self.expect_word("PARTITIONING")?;
                Ok(vec![AlterAction::new(ActionKind::RemovePartitioning)])
            }
            "PARTITION" if self.peek_at(1).is_word("BY") => self.partition_clause(ActionKind::PartitionBy),
            _ => {
                // Unsupported clause (COMMENT=, ANALYZE PARTITION, ...)
                self.skip_spec()?;
                Ok(Vec::new())
            }
        }
    }

    // ===== ADD / DROP =====

    fn add_spec(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        if self.eat_word("COLUMN") {
            return self.add_columns();
        }

        let keyword = match self.current() {
            Token::Word(w) => w.to_ascii_uppercase(),
            Token::LParen => return self.add_columns(),
            _ => String::new(),
        };

        match keyword.as_str() {
            "INDEX" | "KEY" => {
                self.advance();
                self.index(ActionKind::AddIndex)
            }
            "FULLTEXT" => {
                self.advance();
                let _ = self.eat_word("INDEX") || self.eat_word("KEY");
                self.index(ActionKind::AddFulltextIndex)
            }
            "SPATIAL" => {
                self.advance();
                let _ = self.eat_word("INDEX") || self.eat_word("KEY");
                self.index(ActionKind::AddSpatialIndex)
            }
            "CONSTRAINT" | "PRIMARY" | "UNIQUE" | "FOREIGN" | "CHECK" => self.add_constraint(),
            "PARTITION" => {
                self.advance();
                self.skip_spec()?;
                Ok(vec![AlterAction::new(ActionKind::AddPartition)])
            }
            _ => self.add_columns(),
        }
    }

    /// `ADD [COLUMN]` after the optional keyword: a single definition or a list
    fn add_columns(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        if self.eat(&Token::LParen) {
            let mut actions = Vec::new();
            loop {
                let column = self.column_definition()?;
                actions.push(AlterAction::with_detail(
                    ActionKind::AddColumn,
                    column.into_detail(String::new()),
                ));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
            return Ok(actions);
        }

        let column = self.column_definition()?;
        let position = self.position()?;
        Ok(vec![AlterAction::with_detail(
            ActionKind::AddColumn,
            column.into_detail(position),
        )])
    }

    /// `[name] [USING type] (cols) [options]`, after INDEX/KEY
    fn index(&mut self, kind: ActionKind) -> Result<Vec<AlterAction>, ParseError> {
        let index_name = if matches!(self.current(), Token::Word(_) | Token::Quoted(_)) && !self.at_word("USING") {
            self.identifier()?
        } else {
            String::new()
        };
        if self.eat_word("USING") {
            self.advance();
        }
        let index_columns = self.column_list()?;
        self.skip_spec()?;
        Ok(vec![AlterAction::with_detail(
            kind,
            ActionDetail {
                index_name,
                index_columns,
                ..Default::default()
            },
        )])
    }

    fn add_constraint(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        let mut symbol = String::new();
        if self.eat_word("CONSTRAINT") {
            let keyword_follows = ["PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
                .iter()
                .any(|k| self.at_word(k));
            if !keyword_follows {
                symbol = self.identifier()?;
            }
        }

        if self.eat_word("PRIMARY") {
            self.expect_word("KEY")?;
            if self.eat_word("USING") {
                self.advance();
            }
            let index_columns = self.column_list()?;
            self.skip_spec()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::AddPrimaryKey,
                ActionDetail {
                    index_columns,
                    ..Default::default()
                },
            )]);
        }

        if self.eat_word("UNIQUE") {
            let _ = self.eat_word("INDEX") || self.eat_word("KEY");
            let mut actions = self.index(ActionKind::AddUniqueIndex)?;
            for action in &mut actions {
                if action.detail.index_name.is_empty() {
                    action.detail.index_name = symbol.clone();
                }
            }
            return Ok(actions);
        }

        if self.eat_word("FOREIGN") {
            self.expect_word("KEY")?;
            let mut constraint_name = symbol;
            if matches!(self.current(), Token::Word(_) | Token::Quoted(_)) {
                let index_name = self.identifier()?;
                if constraint_name.is_empty() {
                    constraint_name = index_name;
                }
            }
            let index_columns = self.column_list()?;
            self.expect_word("REFERENCES")?;
            let (_, ref_table) = self.table_name()?;
            let ref_columns = self.column_list()?;
            // ON DELETE / ON UPDATE / MATCH
            self.skip_spec()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::AddForeignKey,
                ActionDetail {
                    constraint_name,
                    index_columns,
                    ref_table,
                    ref_columns,
                    ..Default::default()
                },
            )]);
        }

        // CHECK constraints do not change storage
        self.skip_spec()?;
        Ok(Vec::new())
    }

    fn drop_spec(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        if self.eat_word("PRIMARY") {
            self.expect_word("KEY")?;
            return Ok(vec![AlterAction::new(ActionKind::DropPrimaryKey)]);
        }
        if self.eat_word("FOREIGN") {
            self.expect_word("KEY")?;
            let constraint_name = self.identifier()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::DropForeignKey,
                ActionDetail {
                    constraint_name,
                    ..Default::default()
                },
            )]);
        }
        if self.eat_word("INDEX") || self.eat_word("KEY") {
            let index_name = self.identifier()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::DropIndex,
                ActionDetail {
                    index_name,
                    ..Default::default()
                },
            )]);
        }
        if self.at_word("PARTITION") {
            self.skip_spec()?;
            return Ok(vec![AlterAction::new(ActionKind::DropPartition)]);
        }
        if self.at_word("CHECK") || self.at_word("CONSTRAINT") {
            self.skip_spec()?;
            return Ok(Vec::new());
        }

        self.eat_word("COLUMN");
        let column_name = self.identifier()?;
        self.eat_word("RESTRICT");
        self.eat_word("CASCADE");
        Ok(vec![AlterAction::with_detail(
            ActionKind::DropColumn,
            ActionDetail {
                column_name,
                ..Default::default()
            },
        )])
    }

    // ===== RENAME / ALTER COLUMN =====

    fn rename(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        if self.eat_word("COLUMN") {
            let old_column_name = self.identifier()?;
            self.expect_word("TO")?;
            let column_name = self.identifier()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::RenameColumn,
                ActionDetail {
                    column_name,
                    old_column_name,
                    ..Default::default()
                },
            )]);
        }
        if self.eat_word("INDEX") || self.eat_word("KEY") {
            let old_index_name = self.identifier()?;
            self.expect_word("TO")?;
            let index_name = self.identifier()?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::RenameIndex,
                ActionDetail {
                    index_name,
                    old_index_name,
                    ..Default::default()
                },
            )]);
        }

        let _ = self.eat_word("TO") || self.eat_word("AS");
        let (_, new_name) = self.table_name()?;
        Ok(vec![AlterAction::with_detail(
            ActionKind::RenameTable,
            ActionDetail {
                new_table: new_name,
                ..Default::default()
            },
        )])
    }

    fn alter_column(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        if self.at_word("INDEX") || self.at_word("CHECK") || self.at_word("CONSTRAINT") {
            // visibility / enforcement toggles
            self.skip_spec()?;
            return Ok(Vec::new());
        }
        self.eat_word("COLUMN");
        let column_name = self.identifier()?;

        if self.eat_word("SET") {
            if self.eat_word("DEFAULT") {
                let default_value = self.default_value()?;
                return Ok(vec![AlterAction::with_detail(
                    ActionKind::AlterColumnSetDefault,
                    ActionDetail {
                        column_name,
                        default_value: Some(default_value),
                        ..Default::default()
                    },
                )]);
            }
            // SET VISIBLE / SET INVISIBLE
            self.skip_spec()?;
            return Ok(Vec::new());
        }
        if self.eat_word("DROP") {
            self.expect_word("DEFAULT")?;
            return Ok(vec![AlterAction::with_detail(
                ActionKind::AlterColumnDropDefault,
                ActionDetail {
                    column_name,
                    ..Default::default()
                },
            )]);
        }
        Err(self.expected("SET or DROP"))
    }

    // ===== TABLE OPTIONS =====

    fn table_option(&mut self, kind: ActionKind) -> Result<Vec<AlterAction>, ParseError> {
        self.advance();
        self.option_value()?;
        Ok(vec![AlterAction::new(kind)])
    }

    /// `CHARACTER SET [=] x` or `CHARSET [=] x`
    fn charset_clause(&mut self) -> Result<String, ParseError> {
        if self.eat_word("CHARACTER") {
            self.expect_word("SET")?;
        } else {
            self.expect_word("CHARSET")?;
        }
        Ok(self.option_value()?.to_lowercase())
    }

    fn skip_collate(&mut self) -> Result<(), ParseError> {
        if self.eat_word("COLLATE") {
            self.option_value()?;
        }
        Ok(())
    }

    /// `[DEFAULT] CHARACTER SET ...` or `[DEFAULT] COLLATE ...`
    fn specify_charset(&mut self) -> Result<Vec<AlterAction>, ParseError> {
        self.eat_word("DEFAULT");
        if self.at_word("COLLATE") {
            self.skip_collate()?;
            return Ok(Vec::new());
        }
        let charset = self.charset_clause()?;
        self.skip_collate()?;
        Ok(vec![AlterAction::with_detail(
            ActionKind::SpecifyCharacterSet,
            ActionDetail {
                charset,
                ..Default::default()
            },
        )])
    }

    fn partition_clause(&mut self, kind: ActionKind) -> Result<Vec<AlterAction>, ParseError> {
        self.skip_spec()?;
        Ok(vec![AlterAction::new(kind)])
    }

    // ===== COLUMN DEFINITIONS =====

    /// `FIRST` or `AFTER col`, empty when trailing
    fn position(&mut self) -> Result<String, ParseError> {
        if self.eat_word("FIRST") {
            return Ok("FIRST".to_string());
        }
        if self.eat_word("AFTER") {
            return Ok(format!("AFTER {}", self.identifier()?));
        }
        Ok(String::new())
    }

    fn column_definition(&mut self) -> Result<ColumnDef, ParseError> {
        let mut column = ColumnDef {
            name: self.identifier()?,
            column_type: self.data_type()?,
            ..Default::default()
        };

        loop {
            if self.at_spec_end()
                || self.current() == &Token::RParen
                || self.at_word("FIRST")
                || self.at_word("AFTER")
            {
                break;
            }

            if self.eat_word("NOT") {
                self.expect_word("NULL")?;
                column.not_null = true;
            } else if self.eat_word("NULL") {
                column.not_null = false;
            } else if self.eat_word("DEFAULT") {
                column.default_value = Some(self.default_value()?);
            } else if self.eat_word("AUTO_INCREMENT") {
                column.auto_increment = true;
            } else if self.eat_word("GENERATED") {
                self.expect_word("ALWAYS")?;
            } else if self.eat_word("AS") {
                self.skip_group()?;
                column.generated = Some(GeneratedKind::Virtual);
            } else if self.eat_word("STORED") {
                column.generated = Some(GeneratedKind::Stored);
            } else if self.eat_word("VIRTUAL") {
                column.generated = Some(GeneratedKind::Virtual);
            } else if self.eat_word("ON") {
                // ON UPDATE CURRENT_TIMESTAMP[(n)]
                self.expect_word("UPDATE")?;
                self.default_value()?;
            } else if self.eat_word("COMMENT") || self.eat_word("COLLATE") {
                self.option_value()?;
            } else if self.eat_word("CHARACTER") {
                self.expect_word("SET")?;
                self.option_value()?;
            } else if self.current() == &Token::LParen {
                self.skip_group()?;
            } else {
                // PRIMARY KEY, UNIQUE, VISIBLE, SRID n, ...
                self.advance();
            }
        }
        Ok(column)
    }

    /// Type name plus arguments and sign modifiers, lower-cased:
    /// `VARCHAR(255)` -> `varchar(255)`, `INT UNSIGNED` -> `int unsigned`
    fn data_type(&mut self) -> Result<String, ParseError> {
        let mut column_type = match self.current() {
            Token::Word(w) => w.to_lowercase(),
            _ => return Err(self.expected("column type")),
        };
        self.advance();

        if self.eat(&Token::LParen) {
            let mut args = Vec::new();
            loop {
                let arg = match self.current() {
                    Token::Num(n) => n.clone(),
                    Token::Str(s) => format!("'{}'", s.replace('\'', "''")),
                    Token::Word(w) => w.to_lowercase(),
                    _ => return Err(self.expected("type argument")),
                };
                self.advance();
                args.push(arg);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
            column_type = format!("{}({})", column_type, args.join(","));
        }

        for modifier in ["UNSIGNED", "ZEROFILL"] {
            if self.eat_word(modifier) {
                column_type.push(' ');
                column_type.push_str(&modifier.to_lowercase());
            }
        }
        Ok(column_type)
    }

    /// Literal, keyword (NULL, CURRENT_TIMESTAMP[(n)]), signed number or `(expr)`
    fn default_value(&mut self) -> Result<String, ParseError> {
        let start = self.tokens.get(self.pos).map(|s| s.start).unwrap_or_default();
        let value = match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            Token::Num(n) => {
                self.advance();
                n
            }
            Token::Symbol(sign @ ('-' | '+')) => {
                self.advance();
                match self.current().clone() {
                    Token::Num(n) => {
                        self.advance();
                        format!("{}{}", sign, n)
                    }
                    _ => return Err(self.expected("number")),
                }
            }
            Token::Word(w) => {
                self.advance();
                if self.current() == &Token::LParen {
                    self.skip_group()?;
                    let end = self.tokens.get(self.pos - 1).map(|s| s.end).unwrap_or(start);
                    self.source_between(start, end)
                } else {
                    w
                }
            }
            Token::LParen => {
                self.skip_group()?;
                let end = self.tokens.get(self.pos - 1).map(|s| s.end).unwrap_or(start);
                self.source_between(start, end)
            }
            _ => return Err(self.expected("default value")),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(sql: &str) -> AlterOperation {
        let mut ops = parse(sql).unwrap();
        assert_eq!(ops.len(), 1);
        ops.remove(0)
    }

    fn kinds(op: &AlterOperation) -> Vec<ActionKind> {
        op.actions.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_add_nullable_column() {
        let op = single("ALTER TABLE Shop.Users ADD COLUMN nickname VARCHAR(50);");
        assert_eq!(op.schema, "shop");
        assert_eq!(op.table, "users");
        assert_eq!(op.raw_sql, "ALTER TABLE Shop.Users ADD COLUMN nickname VARCHAR(50)");

        let detail = &op.actions[0].detail;
        assert_eq!(op.actions[0].kind, ActionKind::AddColumn);
        assert_eq!(detail.column_name, "nickname");
        assert_eq!(detail.column_type, "varchar(50)");
        assert_eq!(detail.is_nullable, Some(true));
        assert_eq!(detail.position, "");
    }

    #[test]
    fn test_add_column_attributes() {
        let op = single(
            "ALTER TABLE orders ADD `seq` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT DEFAULT 0 COMMENT 'x' AFTER id",
        );
        let detail = &op.actions[0].detail;
        assert_eq!(detail.column_name, "seq");
        assert_eq!(detail.column_type, "bigint unsigned");
        assert_eq!(detail.is_nullable, Some(false));
        assert!(detail.is_auto_increment);
        assert_eq!(detail.default_value.as_deref(), Some("0"));
        assert_eq!(detail.position, "AFTER id");
    }

    #[test]
    fn test_generated_columns() {
        let op = single(
            "ALTER TABLE orders \
             ADD COLUMN total DECIMAL(10,2) GENERATED ALWAYS AS (price * qty) STORED, \
             ADD COLUMN label VARCHAR(20) AS (concat(a, b))",
        );
        assert_eq!(op.actions[0].detail.column_type, "decimal(10,2)");
        assert_eq!(op.actions[0].detail.generated_type, Some(GeneratedKind::Stored));
        assert_eq!(op.actions[1].detail.generated_type, Some(GeneratedKind::Virtual));
    }

    #[test]
    fn test_add_column_list() {
        let op = single("ALTER TABLE t ADD (a INT, b ENUM('x','y') NOT NULL DEFAULT 'x')");
        assert_eq!(kinds(&op), vec![ActionKind::AddColumn, ActionKind::AddColumn]);
        assert_eq!(op.actions[1].detail.column_type, "enum('x','y')");
        assert_eq!(op.actions[1].detail.default_value.as_deref(), Some("x"));
    }

    #[test]
    fn test_modify_and_change() {
        let op = single(
            "ALTER TABLE users MODIFY COLUMN name VARCHAR(300) NOT NULL FIRST, CHANGE email contact TEXT",
        );
        assert_eq!(kinds(&op), vec![ActionKind::ModifyColumn, ActionKind::ChangeColumn]);
        assert_eq!(op.actions[0].detail.position, "FIRST");
        assert_eq!(op.actions[1].detail.old_column_name, "email");
        assert_eq!(op.actions[1].detail.column_name, "contact");
        assert_eq!(op.actions[1].detail.column_type, "text");
    }

    #[test]
    fn test_indexes_and_keys() {
        let op = single(
            "ALTER TABLE posts \
             ADD INDEX idx_user (user_id, created_at DESC), \
             ADD UNIQUE KEY uk_slug (slug(100)), \
             ADD FULLTEXT INDEX ft_body (body), \
             ADD SPATIAL INDEX sp_loc (location), \
             ADD PRIMARY KEY (id), \
             DROP INDEX idx_old, \
             DROP PRIMARY KEY, \
             RENAME INDEX a TO b",
        );
        assert_eq!(
            kinds(&op),
            vec![
                ActionKind::AddIndex,
                ActionKind::AddUniqueIndex,
                ActionKind::AddFulltextIndex,
                ActionKind::AddSpatialIndex,
                ActionKind::AddPrimaryKey,
                ActionKind::DropIndex,
                ActionKind::DropPrimaryKey,
                ActionKind::RenameIndex,
            ]
        );
        assert_eq!(op.actions[0].detail.index_columns, vec!["user_id", "created_at"]);
        assert_eq!(op.actions[1].detail.index_name, "uk_slug");
        assert_eq!(op.actions[7].detail.old_index_name, "a");
    }

    #[test]
    fn test_foreign_keys() {
        let op = single(
            "ALTER TABLE orders ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE, \
             DROP FOREIGN KEY fk_old",
        );
        assert_eq!(kinds(&op), vec![ActionKind::AddForeignKey, ActionKind::DropForeignKey]);
        let fk = &op.actions[0].detail;
        assert_eq!(fk.constraint_name, "fk_user");
        assert_eq!(fk.index_columns, vec!["user_id"]);
        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.ref_columns, vec!["id"]);
        assert_eq!(op.actions[1].detail.constraint_name, "fk_old");
    }

    #[test]
    fn test_table_options() {
        let op = single(
            "ALTER TABLE t ENGINE=InnoDB, CONVERT TO CHARACTER SET utf8mb4 COLLATE utf8mb4_bin, \
             DEFAULT CHARSET = latin1, ROW_FORMAT=compressed, KEY_BLOCK_SIZE=8, AUTO_INCREMENT=1000, \
             STATS_PERSISTENT=1, ENCRYPTION='Y', FORCE, ALGORITHM=INPLACE, LOCK=NONE",
        );
        assert_eq!(
            kinds(&op),
            vec![
                ActionKind::ChangeEngine,
                ActionKind::ConvertCharacterSet,
                ActionKind::SpecifyCharacterSet,
                ActionKind::ChangeRowFormat,
                ActionKind::ChangeKeyBlockSize,
                ActionKind::ChangeAutoIncrement,
                ActionKind::SetTableStats,
                ActionKind::TableEncryption,
                ActionKind::ForceRebuild,
            ]
        );
        assert_eq!(op.actions[0].detail.engine, "InnoDB");
        assert_eq!(op.actions[1].detail.charset, "utf8mb4");
        assert_eq!(op.actions[3].detail.row_format, "COMPRESSED");
    }

    #[test]
    fn test_rename_and_defaults() {
        let op = single(
            "ALTER TABLE t RENAME COLUMN a TO b, ALTER COLUMN c SET DEFAULT 'z', ALTER d DROP DEFAULT, RENAME TO t2",
        );
        assert_eq!(
            kinds(&op),
            vec![
                ActionKind::RenameColumn,
                ActionKind::AlterColumnSetDefault,
                ActionKind::AlterColumnDropDefault,
                ActionKind::RenameTable,
            ]
        );
        assert_eq!(op.actions[0].detail.old_column_name, "a");
        assert_eq!(op.actions[1].detail.default_value.as_deref(), Some("z"));
        assert_eq!(op.actions[3].detail.new_table, "t2");
        assert!(op.actions[3].detail.column_name.is_empty());
    }

    #[test]
    fn test_partition_clauses() {
        let ops = parse(
            "ALTER TABLE p ADD PARTITION (PARTITION p3 VALUES LESS THAN (2025));\n\
             ALTER TABLE p DROP PARTITION p0, p1;\n\
             ALTER TABLE p COALESCE PARTITION 2;\n\
             ALTER TABLE p REORGANIZE PARTITION p0 INTO (PARTITION a VALUES LESS THAN (10), PARTITION b VALUES LESS THAN (20));\n\
             ALTER TABLE p TRUNCATE PARTITION ALL;\n\
             ALTER TABLE p EXCHANGE PARTITION p0 WITH TABLE q WITHOUT VALIDATION;\n\
             ALTER TABLE p DISCARD PARTITION p0 TABLESPACE;\n\
             ALTER TABLE p IMPORT PARTITION p0 TABLESPACE;\n\
             ALTER TABLE p REMOVE PARTITIONING;\n\
             ALTER TABLE p PARTITION BY HASH(id) PARTITIONS 4;",
        )
        .unwrap();
        let kinds: Vec<ActionKind> = ops.iter().map(|op| op.actions[0].kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::AddPartition,
                ActionKind::DropPartition,
                ActionKind::CoalescePartition,
                ActionKind::ReorganizePartition,
                ActionKind::TruncatePartition,
                ActionKind::ExchangePartition,
                ActionKind::DiscardPartitionTablespace,
                ActionKind::ImportPartitionTablespace,
                ActionKind::RemovePartitioning,
                ActionKind::PartitionBy,
            ]
        );
    }

    #[test]
    fn test_non_alter_statements_are_skipped() {
        let ops = parse(
            "SET foreign_key_checks = 0;\n\
             -- migrate\n\
             CREATE TABLE x (id INT);\n\
             ALTER TABLE a DROP COLUMN b;\n\
             ALTER TABLE c ADD INDEX (d);",
        )
        .unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].raw_sql, "ALTER TABLE a DROP COLUMN b");
        assert_eq!(ops[1].actions[0].detail.index_columns, vec!["d"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("SELECT 1;"), Err(ParseError::NoAlterStatements));
        assert_eq!(parse(""), Err(ParseError::NoAlterStatements));
        assert!(matches!(
            parse("ALTER TABLE t ALGORITHM=INPLACE"),
            Err(ParseError::NoSupportedActions(_))
        ));
        assert_eq!(parse("ALTER TABLE t ADD COLUMN"), Err(ParseError::UnexpectedEof));
        assert!(matches!(
            parse("ALTER TABLE t DROP COLUMN ("),
            Err(ParseError::Expected { .. })
        ));
    }
}
