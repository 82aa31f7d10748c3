//! Typed device property accessors
//!
//! A non-owning wrapper around an NVML device handle. String and integer
//! properties are routed through the generic bridge with their NVML
//! symbol names; the handful of getters with bespoke signatures are
//! resolved individually.

use crate::error::{NvmlError, Result};
use crate::nvml::bridge;
use crate::nvml::loader::NvmlLib;
use crate::nvml::text;

use nvml_wrapper_sys::bindings::{
    nvmlDevice_t, nvmlReturn_enum, nvmlReturn_enum_NVML_SUCCESS,
    NVML_DEVICE_INFOROM_VERSION_BUFFER_SIZE, NVML_DEVICE_NAME_BUFFER_SIZE,
    NVML_DEVICE_SERIAL_BUFFER_SIZE, NVML_DEVICE_UUID_BUFFER_SIZE,
    NVML_DEVICE_VBIOS_VERSION_BUFFER_SIZE,
};
use std::os::raw::{c_uint, c_ulonglong};

// FFI constant for the GPU die temperature sensor
// (NVML_TEMPERATURE_GPU in nvml.h)
const NVML_TEMPERATURE_GPU: c_uint = 0;

/// Clock domain selector for [`Device::clock_info`] and
/// [`Device::max_clock_info`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    Graphics,
    Sm,
    Memory,
}

impl ClockKind {
    fn as_raw(self) -> c_uint {
        match self {
            ClockKind::Graphics => 0,
            ClockKind::Sm => 1,
            ClockKind::Memory => 2,
        }
    }
}

/// Device memory in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// GPU and memory utilization in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utilization {
    pub gpu: u32,
    pub memory: u32,
}

// nvmlMemory_t layout
#[repr(C)]
#[derive(Clone, Copy)]
struct NvmlMemory {
    total: c_ulonglong,
    free: c_ulonglong,
    used: c_ulonglong,
}

// nvmlUtilization_t layout
#[repr(C)]
#[derive(Clone, Copy)]
struct NvmlUtilization {
    gpu: c_uint,
    memory: c_uint,
}

/// Non-owning wrapper around an NVML device handle.
///
/// The handle is created and owned by NVML on behalf of the caller; this
/// wrapper never copies, clones, or frees it, and every accessor performs
/// a live call. No validation happens on this side: a handle that does
/// not refer to a live device makes the library report an error on every
/// call.
pub struct Device<'lib> {
    handle: nvmlDevice_t,
    lib: &'lib NvmlLib,
}

impl<'lib> Device<'lib> {
    /// Wrap a device handle the caller obtained from NVML.
    pub fn from_raw(lib: &'lib NvmlLib, handle: nvmlDevice_t) -> Self {
        Self { handle, lib }
    }

    /// The raw handle, for NVML calls this crate does not cover.
    pub fn handle(&self) -> nvmlDevice_t {
        self.handle
    }

    /// Fetch a text property through the bridge, converting the buffer
    /// NVML filled into an owned string.
    fn text_property(&self, symbol: &str, length: usize) -> Result<String> {
        let accessor = self.lib.text_accessor(symbol)?;
        let mut buf = text::text_buffer(length);

        bridge::get_text_property(
            |dev, out, len| unsafe { accessor(dev, out, len) },
            self.handle,
            &mut buf,
        )?;

        let value = text::string_from_buf(&buf);
        if value.is_empty() {
            return Err(NvmlError::EmptyProperty);
        }
        Ok(value)
    }

    fn int_property(&self, symbol: &str) -> Result<u32> {
        let accessor = self.lib.int_accessor(symbol)?;
        let mut value: c_uint = 0;

        bridge::get_int_property(
            |dev, out| unsafe { accessor(dev, out) },
            self.handle,
            &mut value,
        )?;

        Ok(value)
    }

    // Text properties

    /// Product name of the device, e.g. "Tesla K40m".
    pub fn name(&self) -> Result<String> {
        self.text_property("nvmlDeviceGetName", NVML_DEVICE_NAME_BUFFER_SIZE as usize)
    }

    /// Globally unique immutable identifier of the device.
    pub fn uuid(&self) -> Result<String> {
        self.text_property("nvmlDeviceGetUUID", NVML_DEVICE_UUID_BUFFER_SIZE as usize)
    }

    /// Board serial number.
    pub fn serial(&self) -> Result<String> {
        self.text_property("nvmlDeviceGetSerial", NVML_DEVICE_SERIAL_BUFFER_SIZE as usize)
    }

    /// Global inforom image version.
    pub fn inforom_image_version(&self) -> Result<String> {
        self.text_property(
            "nvmlDeviceGetInforomImageVersion",
            NVML_DEVICE_INFOROM_VERSION_BUFFER_SIZE as usize,
        )
    }

    /// VBIOS version of the device.
    pub fn vbios_version(&self) -> Result<String> {
        self.text_property(
            "nvmlDeviceGetVbiosVersion",
            NVML_DEVICE_VBIOS_VERSION_BUFFER_SIZE as usize,
        )
    }

    // Integer properties

    /// NVML index of the device.
    pub fn index(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetIndex")
    }

    /// Minor number of the device. The device node file for the GPU is
    /// /dev/nvidia[minor number].
    pub fn minor_number(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetMinorNumber")
    }

    /// Checksum of the configuration stored in the device's inforom.
    /// Identical configurations checksum identically across devices.
    pub fn inforom_configuration_checksum(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetInforomConfigurationChecksum")
    }

    /// Maximum PCIe link generation possible with this device and system.
    pub fn max_pcie_link_generation(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetMaxPcieLinkGeneration")
    }

    /// Maximum PCIe link width possible with this device and system.
    pub fn max_pcie_link_width(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetMaxPcieLinkWidth")
    }

    /// Current PCIe link generation.
    pub fn curr_pcie_link_generation(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetCurrPcieLinkGeneration")
    }

    /// Current PCIe link width.
    pub fn curr_pcie_link_width(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetCurrPcieLinkWidth")
    }

    /// PCIe replay counter.
    pub fn pcie_replay_counter(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetPcieReplayCounter")
    }

    /// Current fan speed in percent, on devices that have fans.
    pub fn fan_speed(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetFanSpeed")
    }

    /// Power management limit for the device, in mW.
    pub fn power_management_limit(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetPowerManagementLimit")
    }

    /// Default upper limit for the power the card may draw, in mW.
    pub fn power_management_default_limit(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetPowerManagementDefaultLimit")
    }

    /// Current power usage of the device, in mW.
    pub fn power_usage(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetPowerUsage")
    }

    /// Effective power limit the driver enforces after all limiters.
    pub fn enforced_power_limit(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetEnforcedPowerLimit")
    }

    /// Board id, identical for GPUs connected to the same PLX.
    pub fn board_id(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetBoardId")
    }

    /// Whether the device sits on a multi-GPU board.
    pub fn multi_gpu_board(&self) -> Result<bool> {
        Ok(self.int_property("nvmlDeviceGetMultiGpuBoard")? != 0)
    }

    /// Current performance state, P0 (maximum) through P15 (minimum).
    /// The pstate enum is a plain unsigned int on the wire, so this rides
    /// the integer-property bridge.
    pub fn power_state(&self) -> Result<u32> {
        self.int_property("nvmlDeviceGetPowerState")
    }

    // Getters outside the two generic shapes

    /// Current temperature of the GPU die in degrees Celsius.
    pub fn temperature(&self) -> Result<u32> {
        type GetTemperatureFn =
            unsafe extern "C" fn(nvmlDevice_t, c_uint, *mut c_uint) -> nvmlReturn_enum;

        let func = self.lib.symbol::<GetTemperatureFn>("nvmlDeviceGetTemperature")?;
        let mut temp: c_uint = 0;
        let ret = unsafe { func(self.handle, NVML_TEMPERATURE_GPU, &mut temp) };

        if ret == nvmlReturn_enum_NVML_SUCCESS {
            Ok(temp)
        } else {
            Err(NvmlError::UnderlyingCallFailed)
        }
    }

    /// Current clock of the selected domain, in MHz.
    pub fn clock_info(&self, clock: ClockKind) -> Result<u32> {
        self.clock_query("nvmlDeviceGetClockInfo", clock)
    }

    /// Maximum clock of the selected domain, in MHz.
    pub fn max_clock_info(&self, clock: ClockKind) -> Result<u32> {
        self.clock_query("nvmlDeviceGetMaxClockInfo", clock)
    }

    fn clock_query(&self, symbol: &str, clock: ClockKind) -> Result<u32> {
        type GetClockFn =
            unsafe extern "C" fn(nvmlDevice_t, c_uint, *mut c_uint) -> nvmlReturn_enum;

        let func = self.lib.symbol::<GetClockFn>(symbol)?;
        let mut clock_mhz: c_uint = 0;
        let ret = unsafe { func(self.handle, clock.as_raw(), &mut clock_mhz) };

        if ret == nvmlReturn_enum_NVML_SUCCESS {
            Ok(clock_mhz)
        } else {
            Err(NvmlError::UnderlyingCallFailed)
        }
    }

    /// Amount of memory used, free, and in total on the device, in bytes.
    pub fn memory_info(&self) -> Result<MemoryInfo> {
        type GetMemoryInfoFn =
            unsafe extern "C" fn(nvmlDevice_t, *mut NvmlMemory) -> nvmlReturn_enum;

        let func = self.lib.symbol::<GetMemoryInfoFn>("nvmlDeviceGetMemoryInfo")?;
        let mut raw = NvmlMemory {
            total: 0,
            free: 0,
            used: 0,
        };
        let ret = unsafe { func(self.handle, &mut raw) };

        if ret == nvmlReturn_enum_NVML_SUCCESS {
            Ok(MemoryInfo {
                total: raw.total,
                used: raw.used,
                free: raw.free,
            })
        } else {
            Err(NvmlError::UnderlyingCallFailed)
        }
    }

    /// GPU and memory utilization rates in percent.
    pub fn utilization_rates(&self) -> Result<Utilization> {
        type GetUtilizationFn =
            unsafe extern "C" fn(nvmlDevice_t, *mut NvmlUtilization) -> nvmlReturn_enum;

        let func = self.lib.symbol::<GetUtilizationFn>("nvmlDeviceGetUtilizationRates")?;
        let mut raw = NvmlUtilization { gpu: 0, memory: 0 };
        let ret = unsafe { func(self.handle, &mut raw) };

        if ret == nvmlReturn_enum_NVML_SUCCESS {
            Ok(Utilization {
                gpu: raw.gpu,
                memory: raw.memory,
            })
        } else {
            Err(NvmlError::UnderlyingCallFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_kind_raw_values_match_nvml() {
        assert_eq!(ClockKind::Graphics.as_raw(), 0);
        assert_eq!(ClockKind::Sm.as_raw(), 1);
        assert_eq!(ClockKind::Memory.as_raw(), 2);
    }

    // Handle acquisition is the embedding application's job; the test
    // resolves nvmlDeviceGetHandleByIndex itself to get one.

    #[test]
    #[ignore = "Requires NVIDIA GPU"]
    fn test_properties_on_first_device() {
        type GetHandleFn =
            unsafe extern "C" fn(c_uint, *mut nvmlDevice_t) -> nvmlReturn_enum;

        let lib = NvmlLib::open().unwrap();
        lib.init().unwrap();

        let get_handle = lib
            .symbol::<GetHandleFn>("nvmlDeviceGetHandleByIndex_v2")
            .unwrap();
        let mut handle: nvmlDevice_t = std::ptr::null_mut();
        let ret = unsafe { get_handle(0, &mut handle) };
        assert_eq!(ret, nvmlReturn_enum_NVML_SUCCESS);

        let device = Device::from_raw(&lib, handle);
        assert!(!device.name().unwrap().is_empty());
        assert_eq!(device.index().unwrap(), 0);
        assert!(device.memory_info().unwrap().total > 0);

        lib.shutdown().unwrap();
    }
}
