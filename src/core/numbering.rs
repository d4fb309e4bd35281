use super::error::RetencionError;

/// Number of trailing template digits that hold the sequence.
pub const SEQUENCE_DIGITS: usize = 8;

const SEQUENCE_MAX: u64 = 99_999_999;

/// Sequential voucher (comprobante) numbers derived from the agent's initial template.
///
/// The template is a fixed-width numeric string whose trailing 8 digits are
/// the starting sequence, e.g. `20250800000001`. For counter `c` the issued
/// number is the template prefix followed by `start + c - 1`, zero-padded to
/// 8 digits, so counter 1 reproduces the template itself.
///
/// The sequence is plain state: persisting the counter is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherSequence {
    prefix: String,
    start: u64,
    counter: u64,
}

impl VoucherSequence {
    /// Create a sequence from a template and the next counter to use.
    pub fn new(template: &str, counter: u64) -> Result<Self, RetencionError> {
        let template = template.trim();
        if template.len() < SEQUENCE_DIGITS {
            return Err(RetencionError::Numbering(format!(
                "voucher template '{template}' must have at least {SEQUENCE_DIGITS} digits"
            )));
        }
        if !template.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RetencionError::Numbering(format!(
                "voucher template '{template}' must be numeric"
            )));
        }
        if counter == 0 {
            return Err(RetencionError::Numbering(
                "voucher counter starts at 1".into(),
            ));
        }

        let split = template.len() - SEQUENCE_DIGITS;
        let start = template[split..]
            .parse()
            .map_err(|e| RetencionError::Numbering(format!("voucher template '{template}': {e}")))?;

        Ok(Self {
            prefix: template[..split].to_string(),
            start,
            counter,
        })
    }

    /// Issue the next voucher number.
    pub fn next_number(&mut self) -> Result<String, RetencionError> {
        let number = self.peek()?;
        self.counter += 1;
        Ok(number)
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> Result<String, RetencionError> {
        let seq = self.start.saturating_add(self.counter - 1);
        if seq > SEQUENCE_MAX {
            return Err(RetencionError::Numbering(format!(
                "voucher sequence exhausted: {seq} does not fit in {SEQUENCE_DIGITS} digits"
            )));
        }
        Ok(format!(
            "{}{:0>width$}",
            self.prefix,
            seq,
            width = SEQUENCE_DIGITS
        ))
    }

    /// Counter value of the next number to be issued.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Issue `n` consecutive numbers, returning them with the advanced sequence.
    ///
    /// `self` is left untouched, so nothing is consumed if the range does not fit.
    pub fn reserve(&self, n: usize) -> Result<(Vec<String>, VoucherSequence), RetencionError> {
        let mut next = self.clone();
        let mut numbers = Vec::with_capacity(n);
        for _ in 0..n {
            numbers.push(next.next_number()?);
        }
        Ok((numbers, next))
    }
}

/// Voucher number for a given template and counter.
pub fn allocate_voucher_number(template: &str, counter: u64) -> Result<String, RetencionError> {
    VoucherSequence::new(template, counter)?.peek()
}
