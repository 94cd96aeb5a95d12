/// Static signature tables for attachment inspection. The declared filename
/// and content type are untrusted; only leading bytes decide the true type.

#[derive(Debug)]
pub struct FileSignature {
    /// Short type token referenced by `risky_executable_types` config.
    pub type_name: &'static str,
    pub description: &'static str,
    pub magic: &'static [u8],
    pub offset: usize,
}

impl FileSignature {
    pub fn is_archive(&self) -> bool {
        matches!(self.type_name, "zip" | "rar" | "sevenzip" | "gzip")
    }
}

pub const FILE_SIGNATURES: &[FileSignature] = &[
    FileSignature {
        type_name: "exe",
        description: "Windows/DOS executable",
        magic: b"MZ",
        offset: 0,
    },
    FileSignature {
        type_name: "elf",
        description: "ELF executable",
        magic: b"\x7fELF",
        offset: 0,
    },
    FileSignature {
        type_name: "macho",
        description: "Mach-O executable",
        magic: &[0xfe, 0xed, 0xfa, 0xce],
        offset: 0,
    },
    FileSignature {
        type_name: "macho",
        description: "Mach-O 64-bit executable",
        magic: &[0xfe, 0xed, 0xfa, 0xcf],
        offset: 0,
    },
    FileSignature {
        type_name: "macho",
        description: "Mach-O executable (little-endian)",
        magic: &[0xce, 0xfa, 0xed, 0xfe],
        offset: 0,
    },
    FileSignature {
        type_name: "macho",
        description: "Mach-O 64-bit executable (little-endian)",
        magic: &[0xcf, 0xfa, 0xed, 0xfe],
        offset: 0,
    },
    FileSignature {
        type_name: "class",
        description: "Java class file",
        magic: &[0xca, 0xfe, 0xba, 0xbe],
        offset: 0,
    },
    FileSignature {
        type_name: "msi",
        description: "OLE compound document (MSI/legacy Office)",
        magic: &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1],
        offset: 0,
    },
    FileSignature {
        type_name: "script",
        description: "interpreter script",
        magic: b"#!",
        offset: 0,
    },
    FileSignature {
        type_name: "zip",
        description: "ZIP archive",
        magic: b"PK\x03\x04",
        offset: 0,
    },
    FileSignature {
        type_name: "rar",
        description: "RAR archive",
        magic: b"Rar!\x1a\x07",
        offset: 0,
    },
    FileSignature {
        type_name: "sevenzip",
        description: "7-Zip archive",
        magic: b"7z\xbc\xaf\x27\x1c",
        offset: 0,
    },
    FileSignature {
        type_name: "gzip",
        description: "gzip archive",
        magic: &[0x1f, 0x8b],
        offset: 0,
    },
];

/// Detect the true file type from leading bytes. First match wins; the
/// table orders longer, more specific magics before shorter ones where they
/// could overlap.
pub fn detect_file_type(bytes: &[u8]) -> Option<&'static FileSignature> {
    FILE_SIGNATURES.iter().find(|sig| {
        bytes.len() >= sig.offset + sig.magic.len()
            && &bytes[sig.offset..sig.offset + sig.magic.len()] == sig.magic
    })
}

#[derive(Debug)]
pub struct MalwareSignature {
    pub name: &'static str,
    pub pattern: &'static [u8],
}

/// Known-malware byte patterns. The EICAR test file is carried under its
/// ClamAV signature name so operators can verify detection end to end.
pub const MALWARE_SIGNATURES: &[MalwareSignature] = &[MalwareSignature {
    name: "Win.Test.EICAR_HDB-1",
    pattern: b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*",
}];

/// Scan a byte window for any known malware pattern.
pub fn find_malware(bytes: &[u8]) -> Option<&'static MalwareSignature> {
    MALWARE_SIGNATURES
        .iter()
        .find(|sig| contains_pattern(bytes, sig.pattern))
}

fn contains_pattern(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EICAR: &[u8] =
        b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

    #[test]
    fn test_detect_common_executable_magics() {
        assert_eq!(detect_file_type(b"MZ\x90\x00rest").unwrap().type_name, "exe");
        assert_eq!(detect_file_type(b"\x7fELF\x02\x01").unwrap().type_name, "elf");
        assert_eq!(
            detect_file_type(b"#!/bin/sh\necho hi").unwrap().type_name,
            "script"
        );
        assert_eq!(
            detect_file_type(b"PK\x03\x04rest-of-zip").unwrap().type_name,
            "zip"
        );
    }

    #[test]
    fn test_plain_text_is_not_detected() {
        assert!(detect_file_type(b"Hello, this is a plain note.").is_none());
        assert!(detect_file_type(b"").is_none());
        assert!(detect_file_type(b"M").is_none());
    }

    #[test]
    fn test_eicar_matches_exact_and_embedded() {
        assert_eq!(find_malware(EICAR).unwrap().name, "Win.Test.EICAR_HDB-1");

        let mut padded = b"some leading junk ".to_vec();
        padded.extend_from_slice(EICAR);
        padded.extend_from_slice(b"\r\n");
        assert!(find_malware(&padded).is_some());

        assert!(find_malware(b"clean bytes").is_none());
    }

    #[test]
    fn test_archive_types() {
        assert!(detect_file_type(b"PK\x03\x04").unwrap().is_archive());
        assert!(detect_file_type(b"Rar!\x1a\x07\x00").unwrap().is_archive());
        assert!(!detect_file_type(b"MZ..").unwrap().is_archive());
    }
}
