use anyhow::{Context, bail};
use nvraw_rs::logger;
use nvraw_rs::nvraw::{
    ExportConfig, NvRawReader, NvRawRecord, ReaderConfig, TiffCompression, TiffExporter,
};

use tracing::{info, warn};

const USAGE: &str = "usage: nvraw_rs <input> [output.tiff] [--debayer]";

fn log_summary(record: &NvRawRecord) {
    info!(
        width = record.width,
        height = record.height,
        bayer = %record.bayer_phase,
        bits = record.actual_bits_per_sample(),
        legacy_version = ?record.legacy_version,
        "Image"
    );
    info!(
        exposure = record.primary_exposure_time(),
        gain = record.primary_sensor_gain(),
        iso = record.iso,
        focus = record.focus_position,
        lux = ?record.lux(),
        "Exposure"
    );
    if let Some(awb) = &record.awb {
        info!(converged = awb.converge_status, gains = ?awb.gains, "White balance");
    }
    if let Some(sensor) = &record.sensor_info {
        info!(sensor = %sensor.sensor_id, fuse = %sensor.fuse_id, "Sensor");
    }
    if let Some(hdr) = &record.hdr {
        info!(
            scheme = %hdr.readout_scheme,
            exposures = hdr.number_of_exposures(),
            "HDR"
        );
    }
    info!(
        format = ?record.output_format(),
        pixel_format = %record.pixel_format,
        compressed = record.is_compressed(),
        normalized = record.is_normalized(),
        max_value = record.max_observed_pixel_value(),
        embedded_top = record.embedded_lines.top.len(),
        embedded_bottom = record.embedded_lines.bottom.len(),
        "Pixels"
    );
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let mut debayer = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--debayer" => debayer = true,
            _ => paths.push(arg),
        }
    }
    let (input, output) = match paths.as_slice() {
        [input] => (input, None),
        [input, output] => (input, Some(output)),
        _ => bail!(USAGE),
    };

    // No native codec is linked into the binary; compressed captures are
    // reported as stored.
    let reader = NvRawReader::new(ReaderConfig::builder().normalize_compressed(false).build());
    let record = reader
        .read_file(input)
        .with_context(|| format!("failed to decode {input}"))?;
    log_summary(&record);

    if let Some(output) = output {
        if record.is_compressed() {
            warn!("Exporting compressed samples without normalization");
        }
        let config = ExportConfig::builder()
            .compression(TiffCompression::DeflateBalanced)
            .predictor(Some(2))
            .debayer(debayer)
            .build();
        TiffExporter::new(config)
            .export_file(&record, output)
            .with_context(|| format!("failed to export {output}"))?;
        info!(output = %output, "Wrote TIFF");
    }

    Ok(())
}
