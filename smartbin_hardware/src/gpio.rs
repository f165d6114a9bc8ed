//! Raspberry Pi backends over `rppal`.

use std::thread::sleep;
use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use smartbin_traits::{Actuator, Buzzer, HwResult, Indicators, Led, RangingPins};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::measure_high_pulse;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

fn output(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    Ok(gpio.get(pin).map_err(gpio_err)?.into_output_low())
}

/// HC-SR04 style trigger/echo pair.
pub struct HcSr04 {
    trig: OutputPin,
    echo: InputPin,
}

impl HcSr04 {
    pub fn new(gpio: &Gpio, trig_pin: u8, echo_pin: u8) -> Result<Self> {
        let trig = output(gpio, trig_pin)?;
        let echo = gpio.get(echo_pin).map_err(gpio_err)?.into_input();
        Ok(Self { trig, echo })
    }
}

impl RangingPins for HcSr04 {
    fn trigger_low(&mut self) -> HwResult<()> {
        self.trig.set_low();
        Ok(())
    }

    fn trigger_high(&mut self) -> HwResult<()> {
        self.trig.set_high();
        Ok(())
    }

    fn echo_high_us(&mut self, timeout: Duration) -> HwResult<i64> {
        let echo = &self.echo;
        match measure_high_pulse(|| echo.is_high(), timeout) {
            Ok(width) => {
                trace!(us = width.as_micros() as u64, "echo pulse");
                Ok(width.as_micros() as i64)
            }
            Err(HwError::EchoTimeout) => Ok(-1),
            Err(e) => Err(e.into()),
        }
    }
}

/// Hobby servo on a software-PWM output.
pub struct PwmServo {
    pin: OutputPin,
    freq_hz: f64,
}

impl PwmServo {
    pub fn new(gpio: &Gpio, pin: u8, freq_hz: u32) -> Result<Self> {
        Ok(Self {
            pin: output(gpio, pin)?,
            freq_hz: f64::from(freq_hz),
        })
    }
}

impl Actuator for PwmServo {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let ratio = f64::from(duty) / f64::from(u16::MAX);
        self.pin
            .set_pwm_frequency(self.freq_hz, ratio)
            .map_err(|e| gpio_err(e).into())
    }

    fn deinit(&mut self) -> HwResult<()> {
        self.pin.clear_pwm().map_err(|e| gpio_err(e).into())
    }
}

pub struct GpioIndicators {
    green: OutputPin,
    yellow: OutputPin,
    red: OutputPin,
}

impl GpioIndicators {
    pub fn new(gpio: &Gpio, green: u8, yellow: u8, red: u8) -> Result<Self> {
        Ok(Self {
            green: output(gpio, green)?,
            yellow: output(gpio, yellow)?,
            red: output(gpio, red)?,
        })
    }
}

impl Indicators for GpioIndicators {
    fn set(&mut self, led: Led, on: bool) -> HwResult<()> {
        let pin = match led {
            Led::Green => &mut self.green,
            Led::Yellow => &mut self.yellow,
            Led::Red => &mut self.red,
        };
        if on { pin.set_high() } else { pin.set_low() }
        Ok(())
    }
}

/// Active buzzer on a plain output; beeps block for their duration.
pub struct GpioBuzzer {
    pin: OutputPin,
}

impl GpioBuzzer {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        Ok(Self {
            pin: output(gpio, pin)?,
        })
    }
}

impl Buzzer for GpioBuzzer {
    fn beep(&mut self, duration: Duration) -> HwResult<()> {
        self.pin.set_high();
        sleep(duration);
        self.pin.set_low();
        Ok(())
    }

    fn alert(&mut self, times: u32) -> HwResult<()> {
        for _ in 0..times {
            self.beep(Duration::from_millis(100))?;
            sleep(Duration::from_millis(100));
        }
        Ok(())
    }

    fn silence(&mut self) -> HwResult<()> {
        self.pin.set_low();
        Ok(())
    }
}

/// Open the GPIO peripheral once for all backends.
pub fn open() -> Result<Gpio> {
    Gpio::new().map_err(gpio_err)
}
