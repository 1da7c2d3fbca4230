//! Reading the document a command works on.

use crate::cli::InputArgs;
use crate::error::Result;
use factlens_decompose::TextNormalizer;
use factlens_domain::traits::Normalizer;
use factlens_domain::Modality;
use std::io::Read;
use tracing::debug;

/// Produce the document text selected by `args`.
///
/// Positional text is used as-is, `--input` is normalized according to
/// `--modality` (text by default), and otherwise stdin is read.
pub fn read_document(args: &InputArgs) -> Result<String> {
    let normalizer = TextNormalizer::new();

    let document = if let Some(text) = &args.text {
        normalizer.normalize(Modality::RawString, text)?
    } else if let Some(path) = &args.input {
        let modality = args.modality.map(Into::into).unwrap_or(Modality::Text);
        normalizer.normalize(modality, &path.to_string_lossy())?
    } else {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        normalizer.normalize(Modality::RawString, &buffer)?
    };

    debug!("Read document of {} bytes", document.len());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ModalityArg;
    use crate::error::CliError;
    use factlens_decompose::NormalizeError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_positional_text() {
        let args = InputArgs {
            text: Some("Alice works at Acme.".to_string()),
            input: None,
            modality: None,
        };
        assert_eq!(read_document(&args).unwrap(), "Alice works at Acme.");
    }

    #[test]
    fn test_input_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Line one.").unwrap();

        let args = InputArgs {
            text: None,
            input: Some(file.path().to_path_buf()),
            modality: None,
        };
        assert_eq!(read_document(&args).unwrap(), "Line one.\n");
    }

    #[test]
    fn test_image_input_is_unsupported() {
        let args = InputArgs {
            text: None,
            input: Some("photo.png".into()),
            modality: Some(ModalityArg::Image),
        };
        assert!(matches!(
            read_document(&args),
            Err(CliError::Normalize(NormalizeError::UnsupportedModality(Modality::Image)))
        ));
    }
}
