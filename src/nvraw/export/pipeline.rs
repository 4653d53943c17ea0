use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::export::debayer::CpuDebayer;
use crate::nvraw::export::standard_tiff_writer::StandardTiffWriter;
use crate::nvraw::export::types::{ExportConfig, GrayImage};
use crate::nvraw::export::writer::TiffWriter;
use crate::nvraw::record::NvRawRecord;

pub struct TiffExporter<W: TiffWriter> {
    writer: W,
    config: ExportConfig,
}

impl TiffExporter<StandardTiffWriter> {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            writer: StandardTiffWriter,
            config,
        }
    }
}

impl<W: TiffWriter> TiffExporter<W> {
    pub fn with_custom(writer: W, config: ExportConfig) -> Self {
        Self { writer, config }
    }

    #[instrument(skip_all, fields(width = record.width, height = record.height))]
    pub fn export(&self, record: &NvRawRecord, output: &mut dyn Write) -> Result<()> {
        let image = {
            let _span = tracing::info_span!("collect_samples").entered();
            GrayImage::from_record(record)?
        };

        if self.config.debayer {
            let rgb = {
                let _span = tracing::info_span!("debayer", phase = %record.bayer_phase).entered();
                CpuDebayer::new().process(&image, record.bayer_phase)?
            };
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_rgb(&rgb, output, &self.config)?;
        } else {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_gray(&image, output, &self.config)?;
        }

        info!(
            width = image.width,
            height = image.height,
            debayer = self.config.debayer,
            "Export complete"
        );
        Ok(())
    }

    #[instrument(skip(self, record, output_path))]
    pub fn export_file<P: AsRef<Path>>(&self, record: &NvRawRecord, output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        info!(output = %output_path.display(), "Exporting capture");

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                NvRawError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        self.export(record, &mut output_file)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }
}
