//! 计算设备探测与启动前置检查
//!
//! 两个前置条件: 有可用设备, 且设备支持推理加速. 任一失败都终止启动, 不做恢复.

use thiserror::Error;

/// 启动失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("this device does not support GPU compute")]
    NoDevice,

    #[error("this device ({0}) does not support accelerated inference")]
    AccelerationUnsupported(String),
}

/// 计算设备句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    name: String,
    compute_units: usize,
    accelerated: bool,
}

impl Device {
    pub fn new(name: impl Into<String>, compute_units: usize, accelerated: bool) -> Self {
        Self {
            name: name.into(),
            compute_units,
            accelerated,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compute_units(&self) -> usize {
        self.compute_units
    }

    pub fn supports_acceleration(&self) -> bool {
        self.accelerated && self.compute_units > 0
    }
}

/// 设备探测接口
pub trait DeviceSource {
    fn system_default(&self) -> Option<Device>;
}

/// 默认探测: 以本机 CPU 线程作为计算单元
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDevices;

impl DeviceSource for SystemDevices {
    fn system_default(&self) -> Option<Device> {
        let units = std::thread::available_parallelism().ok()?.get();
        Some(Device::new(format!("cpu ({} threads)", units), units, true))
    }
}

/// 依次检查两个前置条件, 返回可用设备
pub fn check_preconditions(devices: &dyn DeviceSource) -> Result<Device, SetupError> {
    let device = devices.system_default().ok_or(SetupError::NoDevice)?;
    if !device.supports_acceleration() {
        let name = device.name().to_string();
        return Err(SetupError::AccelerationUnsupported(name));
    }
    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDevices(Option<Device>);

    impl DeviceSource for FixedDevices {
        fn system_default(&self) -> Option<Device> {
            self.0.clone()
        }
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let err = check_preconditions(&FixedDevices(None)).unwrap_err();
        assert_eq!(err, SetupError::NoDevice);
        assert_eq!(err.to_string(), "this device does not support GPU compute");
    }

    #[test]
    fn test_unaccelerated_device_is_fatal() {
        let devices = FixedDevices(Some(Device::new("soft", 4, false)));
        let err = check_preconditions(&devices).unwrap_err();
        assert_eq!(err, SetupError::AccelerationUnsupported("soft".into()));
    }

    #[test]
    fn test_system_devices() {
        let device = check_preconditions(&SystemDevices).unwrap();
        assert!(device.compute_units() >= 1);
        assert!(device.name().starts_with("cpu"));
    }
}
