// External grinding accelerator

use std::process::{Command, Stdio};
use std::time::Instant;

use crate::consensus::pow::{MiningResult, ProofOfWorkSearch, verify_solution};
use crate::consensus::Target;
use crate::core::{BLOCK_HEADER_SIZE, BlockHeader};
use crate::error::{GenesisError, Result};

/// Accelerator invoked as a subprocess, e.g. `bitcoin-util grind`.
///
/// Runs `<program> [args..] <header-hex>` where the header is the 80-byte
/// template (nonce as given by the caller, usually zero). The program prints
/// either a full solved header (160 hex digits) or a nonce (up to 8 hex
/// digits, read as a big-endian number). Nothing it prints is trusted until
/// the header has been rebuilt from the template and re-hashed here.
#[derive(Debug, Clone)]
pub struct ExternalGrinder {
    program: String,
    args: Vec<String>,
}

impl ExternalGrinder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line into program and arguments
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    fn run(&self, header_hex: &str) -> Result<String> {
        log::debug!("Executing accelerator: {} {:?} {}", self.program, self.args, header_hex);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(header_hex)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| violation(format!("failed to spawn {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(violation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Turn accelerator output into a candidate header built on `template`
pub fn parse_response(template: &BlockHeader, response: &str) -> Result<BlockHeader> {
    if response.is_empty() {
        return Err(violation("empty response".to_string()));
    }
    if !response.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(violation(format!("non-hex response {:?}", response)));
    }

    match response.len() {
        len if len == BLOCK_HEADER_SIZE * 2 => BlockHeader::from_hex(response)
            .map_err(|e| violation(format!("unparseable header: {}", e))),
        1..=8 => {
            let nonce = u32::from_str_radix(response, 16)
                .map_err(|e| violation(format!("unparseable nonce: {}", e)))?;
            Ok(template.with_nonce(nonce))
        }
        len => Err(violation(format!(
            "expected {} hex digits or a nonce of at most 8, got {}",
            BLOCK_HEADER_SIZE * 2,
            len
        ))),
    }
}

fn violation(message: String) -> GenesisError {
    GenesisError::AcceleratorContractViolation(message)
}

impl ProofOfWorkSearch for ExternalGrinder {
    fn name(&self) -> &'static str {
        "external"
    }

    fn search(&self, template: &BlockHeader, target: &Target, start_nonce: u32) -> Result<MiningResult> {
        let started = Instant::now();
        let request = template.with_nonce(start_nonce);
        let response = self.run(&request.to_hex())?;

        let solved = parse_response(&request, &response)?;
        let hash = verify_solution(&request, &solved, target).inspect_err(|e| {
            log::warn!("Rejected accelerator result: {}", e);
        })?;

        log::info!("Accelerator returned nonce {}", solved.nonce);
        Ok(MiningResult {
            nonce: solved.nonce,
            hash,
            header: solved,
            attempts: 0,
            duration: started.elapsed(),
        })
    }
}
