/// One-time-code source. The engine hands over the credential's opaque
/// secret and fills whatever code comes back.
pub trait TotpProvider {
    fn code(&self, secret: &str) -> Option<String>;
}

/// No code generation available; one-time-code fields stay empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTotp;

impl TotpProvider for NoTotp {
    fn code(&self, _secret: &str) -> Option<String> {
        None
    }
}

/// Returns the same code for every secret. Used by the CLI `--totp-code`
/// flag and by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCode(pub String);

impl TotpProvider for FixedCode {
    fn code(&self, _secret: &str) -> Option<String> {
        Some(self.0.clone())
    }
}
