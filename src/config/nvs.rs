//! NVS persistence for console parameters with schema versioning.
//!
//! # Blob layout (v1)
//!
//! ```text
//! [schema_ver: u32 LE][param 0: u32 LE][param 1: u32 LE]...
//! ```
//!
//! One word per [`PARAMS`] entry in table order, see
//! [`ParamValue::to_bits`](super::ParamValue::to_bits). Adding a
//! parameter changes the blob length and therefore needs a version bump.

use super::{FlightConfig, PARAMS};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current parameter blob schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for flight configuration
pub const NVS_NAMESPACE: &str = "flight_cfg";

/// NVS key for the parameter blob
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const PARAMS_KEY: &str = "params";

/// Upper bound for the blob size, used for stack buffers
pub const MAX_BLOB_LEN: usize = 512;

/// Persistence errors
#[derive(Debug)]
pub enum NvsError {
    /// NVS initialization failed
    #[cfg(target_os = "espidf")]
    InitFailed(EspError),
    /// NVS read/write error
    #[cfg(target_os = "espidf")]
    IoError(EspError),
    /// No blob stored yet
    NotFound,
    /// Output buffer cannot hold the blob
    BufferTooSmall { needed: usize },
    /// Stored blob has a different schema version
    VersionMismatch { stored: u32, expected: u32 },
    /// Stored blob length does not match the parameter table
    LengthMismatch { stored: usize, expected: usize },
    /// Feature not available on this platform
    #[cfg(not(target_os = "espidf"))]
    NotAvailable,
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::IoError(e)
    }
}

/// Size of an encoded parameter blob.
pub fn blob_len() -> usize {
    4 + 4 * PARAMS.len()
}

/// Encode all registry parameters into `buf`.
///
/// Returns the number of bytes written.
pub fn encode_params(cfg: &FlightConfig, buf: &mut [u8]) -> Result<usize, NvsError> {
    let needed = blob_len();
    if buf.len() < needed {
        return Err(NvsError::BufferTooSmall { needed });
    }

    buf[..4].copy_from_slice(&CURRENT_SCHEMA_VERSION.to_le_bytes());
    for (param, word) in PARAMS.iter().zip(buf[4..needed].chunks_exact_mut(4)) {
        word.copy_from_slice(&param.get(cfg).to_bits().to_le_bytes());
    }

    Ok(needed)
}

/// Decode a blob produced by [`encode_params`] into `cfg`.
///
/// Values are restored verbatim (no range check). On error `cfg` is
/// left untouched.
pub fn decode_params(cfg: &mut FlightConfig, blob: &[u8]) -> Result<(), NvsError> {
    let expected = blob_len();
    if blob.len() < 4 {
        return Err(NvsError::LengthMismatch { stored: blob.len(), expected });
    }

    let stored = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]);
    if stored != CURRENT_SCHEMA_VERSION {
        return Err(NvsError::VersionMismatch { stored, expected: CURRENT_SCHEMA_VERSION });
    }
    if blob.len() != expected {
        return Err(NvsError::LengthMismatch { stored: blob.len(), expected });
    }

    for (param, word) in PARAMS.iter().zip(blob[4..].chunks_exact(4)) {
        let bits = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        param.store_bits(cfg, bits);
    }

    Ok(())
}

/// Persist all parameters to NVS.
#[cfg(target_os = "espidf")]
pub fn save_to_nvs(cfg: &FlightConfig) -> Result<(), NvsError> {
    let partition = EspDefaultNvsPartition::take().map_err(NvsError::InitFailed)?;
    let mut storage = EspNvs::new(partition, NVS_NAMESPACE, true).map_err(NvsError::InitFailed)?;

    let mut buf = [0u8; MAX_BLOB_LEN];
    let len = encode_params(cfg, &mut buf)?;
    storage.set_raw(PARAMS_KEY, &buf[..len])?;
    Ok(())
}

/// Load all parameters from NVS.
#[cfg(target_os = "espidf")]
pub fn load_from_nvs(cfg: &mut FlightConfig) -> Result<(), NvsError> {
    let partition = EspDefaultNvsPartition::take().map_err(NvsError::InitFailed)?;
    let storage = EspNvs::new(partition, NVS_NAMESPACE, true).map_err(NvsError::InitFailed)?;

    let mut buf = [0u8; MAX_BLOB_LEN];
    let blob = storage.get_raw(PARAMS_KEY, &mut buf)?.ok_or(NvsError::NotFound)?;
    decode_params(cfg, blob)
}

#[cfg(not(target_os = "espidf"))]
pub fn save_to_nvs(_cfg: &FlightConfig) -> Result<(), NvsError> {
    Err(NvsError::NotAvailable)
}

#[cfg(not(target_os = "espidf"))]
pub fn load_from_nvs(_cfg: &mut FlightConfig) -> Result<(), NvsError> {
    Err(NvsError::NotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_fits_stack_buffer() {
        assert!(blob_len() <= MAX_BLOB_LEN);
    }

    #[test]
    fn test_encode_rejects_small_buffer() {
        let cfg = FlightConfig::default();
        let mut buf = [0u8; 8];
        assert!(matches!(
            encode_params(&cfg, &mut buf),
            Err(NvsError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_decode_restores_out_of_range_values_verbatim() {
        let mut saved = FlightConfig::default();
        saved.yaw_direction = -1;
        saved.mag_declination = -1250.5;
        saved.esc_pwm_rate = 600; // above the 498 limit

        let mut buf = [0u8; MAX_BLOB_LEN];
        let len = encode_params(&saved, &mut buf).unwrap();

        let mut restored = FlightConfig::default();
        decode_params(&mut restored, &buf[..len]).unwrap();
        assert_eq!(restored, saved);
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let mut buf = [0u8; MAX_BLOB_LEN];
        let len = encode_params(&FlightConfig::default(), &mut buf).unwrap();
        buf[0] = 9;

        let mut cfg = FlightConfig::default();
        cfg.min_command = 1;
        let before = cfg.clone();
        assert!(matches!(
            decode_params(&mut cfg, &buf[..len]),
            Err(NvsError::VersionMismatch { stored: 9, expected: 1 })
        ));
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        let mut buf = [0u8; MAX_BLOB_LEN];
        let len = encode_params(&FlightConfig::default(), &mut buf).unwrap();

        let mut cfg = FlightConfig::default();
        assert!(matches!(
            decode_params(&mut cfg, &buf[..len - 4]),
            Err(NvsError::LengthMismatch { .. })
        ));
    }
}
