//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the node.
//!
//! The configuration record is stored as one blob:
//!
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ schema id LE │ postcard(NodeConfig)        │
//! │   2 bytes    │   variable                  │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! A blob whose schema id differs from the one requested at load time, or
//! that fails to decode, is ignored and the defaults are used instead.
//! On host targets the backend is an in-memory map; on ESP-IDF it is the
//! NVS flash partition (commits are atomic per `nvs_commit()`).

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::{CONFIG_SCHEMA_ID, NodeConfig};
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub const CONFIG_NAMESPACE: &str = "motion";
pub const CONFIG_KEY: &str = "config";

/// Upper bound for the encoded config blob.
const MAX_BLOB_SIZE: usize = 128;
const SCHEMA_HEADER_LEN: usize = 2;

pub struct NvsAdapter {
    /// Schema id and defaults bound by the last `load`.
    schema_id: u16,
    default: NodeConfig,
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a partition version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            schema_id: CONFIG_SCHEMA_ID,
            default: NodeConfig::default(),
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of an NVS name (max 15 chars).
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

// ── Blob encoding ─────────────────────────────────────────────

fn encode_blob(schema_id: u16, config: &NodeConfig) -> Result<Vec<u8>, ConfigError> {
    let body = postcard::to_allocvec(config).map_err(|_| ConfigError::Corrupted)?;
    let mut blob = Vec::with_capacity(SCHEMA_HEADER_LEN + body.len());
    blob.extend_from_slice(&schema_id.to_le_bytes());
    blob.extend_from_slice(&body);
    Ok(blob)
}

fn decode_blob(blob: &[u8], schema_id: u16) -> Result<NodeConfig, ConfigError> {
    let (header, body) = blob
        .split_first_chunk::<SCHEMA_HEADER_LEN>()
        .ok_or(ConfigError::Corrupted)?;
    if u16::from_le_bytes(*header) != schema_id {
        return Err(ConfigError::Corrupted);
    }
    postcard::from_bytes(body).map_err(|_| ConfigError::Corrupted)
}

impl ConfigPort for NvsAdapter {
    fn load(&mut self, schema_id: u16, default: &NodeConfig) -> NodeConfig {
        self.schema_id = schema_id;
        self.default = *default;

        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => match decode_blob(&buf[..len], schema_id) {
                Ok(cfg) => {
                    info!("NvsAdapter: loaded config ({} bytes)", len);
                    cfg
                }
                Err(_) => {
                    warn!(
                        "NvsAdapter: stored config incompatible with schema {:#06x}, using defaults",
                        schema_id
                    );
                    *default
                }
            },
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                *default
            }
            Err(e) => {
                warn!("NvsAdapter: config read error ({}), using defaults", e);
                *default
            }
        }
    }

    fn save(&mut self, config: &NodeConfig) -> Result<(), ConfigError> {
        let blob = encode_blob(self.schema_id, config)?;
        if blob.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::Storage(StorageError::Full));
        }
        self.write(CONFIG_NAMESPACE, CONFIG_KEY, &blob)?;
        info!("NvsAdapter: config saved ({} bytes)", blob.len());
        Ok(())
    }

    fn reset_to_default(&mut self) -> NodeConfig {
        self.default
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => Ok(()),
                Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(StorageError::Full),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }
}
