use crate::config::ScannerConfig;
use crate::error::AttachmentDecodeError;
use crate::message::Attachment;
use crate::signatures;
use std::collections::HashSet;

/// Executable member names worth flagging inside raw archive bytes. Stored
/// entry names sit next to the archive magic uncompressed, so a plain byte
/// scan sees them without any decompression.
const ARCHIVE_EXECUTABLE_EXTENSIONS: &[&str] = &[
    ".exe", ".scr", ".bat", ".cmd", ".pif", ".vbs", ".jar", ".msi", ".dll", ".ps1",
];

#[derive(Debug, Default)]
pub struct AttachmentFindings {
    pub executables: Vec<String>,
    pub viruses: Vec<String>,
    /// Attachments skipped because their payload would not decode.
    pub warnings: Vec<String>,
}

pub struct ExecutableDetector {
    risky_types: HashSet<String>,
    max_scan_bytes: usize,
}

impl ExecutableDetector {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            risky_types: config.risky_executable_types.iter().cloned().collect(),
            max_scan_bytes: config.max_attachment_scan_bytes,
        }
    }

    /// Inspect every attachment in 1-based order. Type sniffing and malware
    /// matching are independent checks; an attachment can trip both.
    pub fn analyze(&self, attachments: &[Attachment]) -> AttachmentFindings {
        let mut findings = AttachmentFindings::default();

        for (position, attachment) in attachments.iter().enumerate() {
            let number = position + 1;
            let bytes = match attachment.decoded() {
                Ok(bytes) => bytes,
                Err(reason) => {
                    let warning = AttachmentDecodeError {
                        index: number,
                        reason,
                    };
                    log::warn!("{}", warning);
                    findings.warnings.push(warning.to_string());
                    continue;
                }
            };
            let window = &bytes[..bytes.len().min(self.max_scan_bytes)];

            if let Some(signature) = signatures::detect_file_type(window) {
                let risky = self.risky_types.contains(signature.type_name)
                    || (signature.is_archive() && archive_lists_executable(window));
                if risky {
                    let filename = attachment.filename.as_deref().unwrap_or("unnamed");
                    findings.executables.push(format!(
                        "Attachment #{} is an executable file named \"{}\" ({}).",
                        number, filename, signature.type_name
                    ));
                }
            }

            if let Some(malware) = signatures::find_malware(window) {
                findings.viruses.push(format!(
                    "Attachment #{} was infected with {}",
                    number, malware.name
                ));
            }
        }

        findings
    }
}

fn archive_lists_executable(bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(bytes).to_lowercase();
    ARCHIVE_EXECUTABLE_EXTENSIONS
        .iter()
        .any(|extension| text.contains(extension))
}
