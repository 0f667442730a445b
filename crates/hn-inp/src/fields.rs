//! Cursor over the whitespace-separated fields of one record.

use hn_core::{FormatError, Real, parse_real};

use crate::section::Record;

pub(crate) struct Fields<'r, 'a> {
    record: &'r Record<'a>,
    pos: usize,
}

impl<'r, 'a> Fields<'r, 'a> {
    pub fn new(record: &'r Record<'a>) -> Self {
        Self { record, pos: 0 }
    }

    /// Required text field.
    pub fn text(&mut self, field: &'static str) -> Result<&'a str, FormatError> {
        self.opt_text().ok_or(FormatError::MissingField {
            section: self.record.section.name(),
            line: self.record.line,
            field,
        })
    }

    /// Required numeric field.
    pub fn real(&mut self, field: &'static str) -> Result<Real, FormatError> {
        let token = self.text(field)?;
        self.number(field, token)
    }

    pub fn opt_text(&mut self) -> Option<&'a str> {
        let token = self.record.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    /// Optional trailing numeric field; malformed text is still an error.
    pub fn opt_real(&mut self, field: &'static str) -> Result<Option<Real>, FormatError> {
        match self.opt_text() {
            Some(token) => self.number(field, token).map(Some),
            None => Ok(None),
        }
    }

    /// Every remaining field as a number.
    pub fn rest_reals(&mut self, field: &'static str) -> Result<Vec<Real>, FormatError> {
        let mut values = Vec::new();
        while let Some(value) = self.opt_real(field)? {
            values.push(value);
        }
        Ok(values)
    }

    pub fn number(&self, field: &'static str, token: &str) -> Result<Real, FormatError> {
        parse_real(token).ok_or_else(|| self.invalid(field, token))
    }

    pub fn invalid(&self, field: &'static str, token: &str) -> FormatError {
        FormatError::InvalidToken {
            section: self.record.section.name(),
            line: self.record.line,
            field,
            token: token.to_string(),
        }
    }

    /// Reject fields the record layout has no room for.
    pub fn finish(mut self) -> Result<(), FormatError> {
        match self.opt_text() {
            Some(token) => Err(FormatError::TrailingField {
                section: self.record.section.name(),
                line: self.record.line,
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::lex;

    #[test]
    fn cursor_reports_missing_invalid_and_trailing() {
        let records = lex("[PIPES]\nP1 A B 1e3 x\n").unwrap();
        let mut f = Fields::new(&records[0]);
        assert_eq!(f.text("id").unwrap(), "P1");
        f.text("node1").unwrap();
        f.text("node2").unwrap();
        assert_eq!(f.real("length").unwrap(), 1000.0);
        let err = f.opt_real("diameter").unwrap_err();
        assert!(
            matches!(err, FormatError::InvalidToken { section: "PIPES", line: 2, field: "diameter", ref token } if token == "x")
        );
        assert!(matches!(
            f.real("roughness").unwrap_err(),
            FormatError::MissingField { field: "roughness", .. }
        ));

        let records = lex("[CURVES]\nC1 1 2 3\n").unwrap();
        let mut f = Fields::new(&records[0]);
        f.text("id").unwrap();
        f.real("x").unwrap();
        f.real("y").unwrap();
        assert!(matches!(f.finish().unwrap_err(), FormatError::TrailingField { ref token, .. } if token == "3"));
    }
}
