//! Documented sandbox test accounts. Only valid against the sandbox environment.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SandboxAccount {
    pub bank_code: &'static str,
    pub bank_name: &'static str,
    pub account_number: &'static str,
    pub account_name: &'static str,
}

pub const SANDBOX_ACCOUNTS: [SandboxAccount; 6] = [
    SandboxAccount { bank_code: "4", bank_name: "Bank Mandiri", account_number: "12340995811", account_name: "Ujang" },
    SandboxAccount { bank_code: "5", bank_name: "Bank Central Asia", account_number: "12330922231", account_name: "Asep" },
    SandboxAccount { bank_code: "6", bank_name: "Bank Jago Syariah", account_number: "12389583322", account_name: "Robert" },
    SandboxAccount { bank_code: "281", bank_name: "OVO", account_number: "081212239281", account_name: "Rudi" },
    SandboxAccount { bank_code: "282", bank_name: "DANA", account_number: "081212239133", account_name: "Zen" },
    SandboxAccount { bank_code: "283", bank_name: "GOPAY", account_number: "081212239222", account_name: "Malik" },
];

const DEFAULT_BANK_CODE: &str = "5";

pub fn by_bank_code(bank_code: &str) -> Option<&'static SandboxAccount> {
    let bank_code = bank_code.trim();
    SANDBOX_ACCOUNTS.iter().find(|account| account.bank_code == bank_code)
}

/// The BCA account.
pub fn default_account() -> SandboxAccount {
    by_bank_code(DEFAULT_BANK_CODE).copied().unwrap_or(SANDBOX_ACCOUNTS[1])
}
