use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_mint::data::model::{IntensityStats, ResultRow, RtProjection};
use rusty_mint::export::write_results_csv;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (label, m/z, retention time of the apex, peak width)
const TARGETS: [(&str, f64, f64, f64); 6] = [
    ("Alanine", 90.0550, 1.8, 0.06),
    ("Citrate", 191.0197, 4.2, 0.09),
    ("Glutamate", 148.0604, 2.6, 0.07),
    ("Lactate", 89.0244, 3.1, 0.05),
    ("Succinate", 117.0193, 5.0, 0.08),
    ("Tryptophan", 205.0972, 6.4, 0.10),
];

/// Relative abundance of every target per tissue.
const TISSUES: [(&str, [f64; 6]); 3] = [
    ("Liver", [1.0, 2.5, 0.8, 1.6, 0.9, 0.4]),
    ("Brain", [0.6, 0.7, 3.0, 2.2, 0.5, 0.9]),
    ("Kidney", [1.4, 1.2, 1.0, 0.7, 2.0, 0.6]),
];

const REPLICATES: usize = 4;
const RT_HALF_WINDOW: f64 = 0.3;
const RT_STEP: f64 = 0.01;
const PEAK_LIST: &str = "targets.csv";

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn write_results_parquet(rows: &[ResultRow], path: &Path) -> Result<()> {
    let text = |f: fn(&ResultRow) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());
    let number = |f: fn(&ResultRow) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("msFile", DataType::Utf8, false),
        Field::new("peakLabel", DataType::Utf8, false),
        Field::new("peakArea", DataType::Float64, false),
        Field::new("rt_max_intensity", DataType::Float64, false),
        Field::new("intensity_median", DataType::Float64, false),
        Field::new("intensity_max", DataType::Float64, false),
        Field::new("intensity_min", DataType::Float64, false),
        Field::new("intensity sum", DataType::Float64, false),
        Field::new("fileSize[MB]", DataType::Float64, false),
        Field::new("peakMz", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.ms_file.as_str())),
            Arc::new(text(|r| r.peak_label.as_str())),
            Arc::new(number(|r| r.peak_area)),
            Arc::new(number(|r| r.rt_max_intensity)),
            Arc::new(number(|r| r.intensity.median)),
            Arc::new(number(|r| r.intensity.max)),
            Arc::new(number(|r| r.intensity.min)),
            Arc::new(number(|r| r.intensity.sum)),
            Arc::new(number(|r| r.file_size_mb)),
            Arc::new(number(|r| r.peak_mz)),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).context("Failed to create output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let mut rows = Vec::new();
    let mut projection = RtProjection::new();

    for (tissue, abundance) in &TISSUES {
        for replicate in 1..=REPLICATES {
            let ms_file = format!("{tissue}_{replicate:02}.mzXML");
            let file_size_mb = 40.0 + rng.next_f64() * 20.0;

            for (&(label, mz, rt, width), &scale) in TARGETS.iter().zip(abundance) {
                let amplitude = 1.0e5 * scale * (1.0 + rng.gauss(0.0, 0.15)).max(0.05);
                let apex = rt + rng.gauss(0.0, 0.01);
                let noise = 0.01 * amplitude;

                let n_steps = (2.0 * RT_HALF_WINDOW / RT_STEP).round() as usize;
                let trace: Vec<(f64, f64)> = (0..=n_steps)
                    .map(|i| {
                        let t = rt - RT_HALF_WINDOW + i as f64 * RT_STEP;
                        let intensity = gaussian(t, apex, width, amplitude) + rng.gauss(0.0, noise).abs();
                        (t, intensity)
                    })
                    .collect();

                let mut intensities: Vec<f64> = trace.iter().map(|(_, i)| *i).collect();
                let (rt_max_intensity, max) = trace
                    .iter()
                    .copied()
                    .fold((rt, f64::NEG_INFINITY), |best, p| if p.1 > best.1 { p } else { best });
                let min = intensities.iter().copied().fold(f64::INFINITY, f64::min);
                let sum: f64 = intensities.iter().sum();

                rows.push(ResultRow {
                    ms_file: ms_file.clone(),
                    peak_label: label.to_string(),
                    peak_area: sum * RT_STEP,
                    rt_max_intensity,
                    intensity: IntensityStats {
                        median: median(&mut intensities),
                        max,
                        min,
                        sum,
                    },
                    file_size_mb,
                    peak_list_file: PEAK_LIST.to_string(),
                    peak_mz: mz,
                    peak_mz_width_ppm: 10.0,
                    rt_window: (rt - RT_HALF_WINDOW, rt + RT_HALF_WINDOW),
                });
                projection.insert(label, &ms_file, trace);
            }
        }
    }

    write_results_csv(&rows, Path::new("sample_results.csv"))?;
    write_results_parquet(&rows, Path::new("sample_results.parquet"))?;
    let json = serde_json::to_string(&projection).context("serializing projections")?;
    std::fs::write("sample_projections.json", json).context("writing projections")?;

    println!(
        "Wrote {} result rows ({} files x {} targets) to sample_results.csv / .parquet \
         and their peak shapes to sample_projections.json",
        rows.len(),
        TISSUES.len() * REPLICATES,
        TARGETS.len()
    );
    Ok(())
}
