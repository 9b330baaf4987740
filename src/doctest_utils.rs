// Internal utilities for documentation and integration tests
// Builds EDF byte images in memory so tests do not depend on fixture files

use std::io;
use std::path::Path;

use crate::ANNOTATION_LABEL;

#[derive(Debug, Clone)]
struct SignalSpec {
    label: String,
    transducer: String,
    physical_unit: String,
    physical_min: String,
    physical_max: String,
    digital_min: String,
    digital_max: String,
    prefilter: String,
    samples_per_record: usize,
    /// 所有记录的数据，按记录顺序拼接
    data: Vec<u8>,
}

/// Assembles an EDF file image field by field.
///
/// Channels are numbered in the order they are added. Data not set explicitly
/// is zero-filled.
#[derive(Debug, Clone)]
pub struct EdfBuilder {
    patient: String,
    recording: String,
    start_date: String,
    start_time: String,
    reserved: String,
    records: i64,
    duration: String,
    signals: Vec<SignalSpec>,
}

impl Default for EdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EdfBuilder {
    pub fn new() -> Self {
        EdfBuilder {
            patient: "X X X X".to_string(),
            recording: "Startdate X X X X".to_string(),
            start_date: "16.10.26".to_string(),
            start_time: "13.05.09".to_string(),
            reserved: String::new(),
            records: 1,
            duration: "1".to_string(),
            signals: Vec::new(),
        }
    }

    pub fn patient(mut self, patient: &str) -> Self {
        self.patient = patient.to_string();
        self
    }

    pub fn recording(mut self, recording: &str) -> Self {
        self.recording = recording.to_string();
        self
    }

    pub fn start(mut self, date: &str, time: &str) -> Self {
        self.start_date = date.to_string();
        self.start_time = time.to_string();
        self
    }

    pub fn reserved(mut self, reserved: &str) -> Self {
        self.reserved = reserved.to_string();
        self
    }

    pub fn records(mut self, records: i64) -> Self {
        self.records = records;
        self
    }

    pub fn record_duration(mut self, duration: &str) -> Self {
        self.duration = duration.to_string();
        self
    }

    /// Adds a channel with ±200 uV over the full 16-bit range.
    pub fn signal(mut self, label: &str, samples_per_record: usize) -> Self {
        self.signals.push(SignalSpec {
            label: label.to_string(),
            transducer: "AgAgCl electrode".to_string(),
            physical_unit: "uV".to_string(),
            physical_min: "-200".to_string(),
            physical_max: "200".to_string(),
            digital_min: "-32768".to_string(),
            digital_max: "32767".to_string(),
            prefilter: "HP:0.1Hz LP:70Hz".to_string(),
            samples_per_record,
            data: Vec::new(),
        });
        self
    }

    /// Adds an "EDF Annotations" channel.
    pub fn annotation_signal(self, samples_per_record: usize) -> Self {
        self.signal(ANNOTATION_LABEL, samples_per_record)
    }

    /// Overrides the calibration of channel `channel`.
    pub fn calibration(
        mut self,
        channel: usize,
        physical: (f64, f64),
        digital: (i64, i64),
    ) -> Self {
        let spec = &mut self.signals[channel];
        spec.physical_min = physical.0.to_string();
        spec.physical_max = physical.1.to_string();
        spec.digital_min = digital.0.to_string();
        spec.digital_max = digital.1.to_string();
        self
    }

    /// Sets every digital sample of channel `channel`, all records concatenated.
    pub fn digital(mut self, channel: usize, samples: &[i16]) -> Self {
        self.signals[channel].data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self
    }

    /// Sets the raw bytes of channel `channel`, one block per record.
    /// Each block is zero-padded to the channel's block size.
    pub fn blocks<B: AsRef<[u8]>>(mut self, channel: usize, blocks: &[B]) -> Self {
        let block_size = self.signals[channel].samples_per_record * 2;
        let mut data = Vec::with_capacity(block_size * blocks.len());
        for block in blocks {
            let mut padded = block.as_ref().to_vec();
            padded.resize(block_size, 0);
            data.extend_from_slice(&padded);
        }
        self.signals[channel].data = data;
        self
    }

    pub fn header_len(&self) -> usize {
        256 * (self.signals.len() + 1)
    }

    pub fn build(&self) -> Vec<u8> {
        let ns = self.signals.len();
        let mut out = Vec::with_capacity(self.header_len());

        push_field(&mut out, "0", 8);
        push_field(&mut out, &self.patient, 80);
        push_field(&mut out, &self.recording, 80);
        push_field(&mut out, &self.start_date, 8);
        push_field(&mut out, &self.start_time, 8);
        push_field(&mut out, &self.header_len().to_string(), 8);
        push_field(&mut out, &self.reserved, 44);
        push_field(&mut out, &self.records.to_string(), 8);
        push_field(&mut out, &self.duration, 8);
        push_field(&mut out, &ns.to_string(), 4);

        let columns: [(fn(&SignalSpec) -> String, usize); 10] = [
            (|s| s.label.clone(), 16),
            (|s| s.transducer.clone(), 80),
            (|s| s.physical_unit.clone(), 8),
            (|s| s.physical_min.clone(), 8),
            (|s| s.physical_max.clone(), 8),
            (|s| s.digital_min.clone(), 8),
            (|s| s.digital_max.clone(), 8),
            (|s| s.prefilter.clone(), 80),
            (|s| s.samples_per_record.to_string(), 8),
            (|_| String::new(), 32),
        ];
        for (value, width) in columns {
            for spec in &self.signals {
                push_field(&mut out, &value(spec), width);
            }
        }

        for record in 0..self.records.max(0) as usize {
            for spec in &self.signals {
                let block_size = spec.samples_per_record * 2;
                let start = record * block_size;
                let mut block = vec![0u8; block_size];
                if start < spec.data.len() {
                    let end = (start + block_size).min(spec.data.len());
                    block[..end - start].copy_from_slice(&spec.data[start..end]);
                }
                out.extend_from_slice(&block);
            }
        }

        out
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        std::fs::write(path, self.build())
    }
}

fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    let mut bytes = value.as_bytes().to_vec();
    bytes.resize(width, b' ');
    out.extend_from_slice(&bytes);
}

/// A single TAL entry as stored in an annotation block.
pub fn tal(onset: &str, duration: Option<&str>, label: &str) -> Vec<u8> {
    let mut out = onset.as_bytes().to_vec();
    if let Some(duration) = duration {
        out.push(0x15);
        out.extend_from_slice(duration.as_bytes());
    }
    out.push(0x14);
    out.extend_from_slice(label.as_bytes());
    out.push(0x14);
    out.push(0x00);
    out
}
