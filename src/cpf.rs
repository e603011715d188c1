//! CPF check-digit validation.
//!
//! A CPF is 11 digits: nine base digits followed by two check digits, each
//! computed with a weighted modulo-11 sum over the digits before it.

/// Number of digits in a CPF.
pub const CPF_LEN: usize = 11;

/// Returns `true` if `cpf` is a checksum-valid CPF.
///
/// Non-digit characters are stripped first. The result is `false` for
/// anything that is not exactly 11 digits afterwards, and for the ten
/// repeated-digit sequences (`00000000000` through `99999999999`), which
/// satisfy the checksum but are not issued.
///
/// ```
/// use cpf_ledger::cpf;
///
/// assert!(cpf::is_valid("52998224725"));
/// assert!(cpf::is_valid("529.982.247-25"));
/// assert!(!cpf::is_valid("52998224726"));
/// ```
pub fn is_valid(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != CPF_LEN || is_repeated_digit(&digits) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Computes the check digit that follows `prefix`.
///
/// Weights run from `prefix.len() + 1` down to 2. A remainder that would
/// produce 10 or 11 maps to 0.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match 11 - sum % 11 {
        10 | 11 => 0,
        rev => rev,
    }
}

fn is_repeated_digit(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}
