use qube_core::link::RegisterAccess;

use crate::error::QubeDriverError;

/// A bit field of a control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterField {
    addr: u32,
    offset: u32,
    pos: u32,
    bits: u32,
}

impl RegisterField {
    /// Creates a new [`RegisterField`] of `bits` bits starting at bit `pos`.
    pub fn new(addr: u32, offset: u32, pos: u32, bits: u32) -> Result<Self, QubeDriverError> {
        if !(1..=32).contains(&bits) {
            return Err(QubeDriverError::out_of_range(
                "register field width",
                bits as f64,
                1.0,
                32.0,
            ));
        }
        if pos > 32 - bits {
            return Err(QubeDriverError::out_of_range(
                "register field position",
                pos as f64,
                0.0,
                (32 - bits) as f64,
            ));
        }
        Ok(Self {
            addr,
            offset,
            pos,
            bits,
        })
    }

    const fn mask(&self) -> u32 {
        u32::MAX >> (32 - self.bits)
    }

    /// Reads the field.
    pub fn read<R: RegisterAccess + ?Sized>(&self, reg: &mut R) -> Result<u32, QubeDriverError> {
        Ok((reg.read_register(self.addr, self.offset)? >> self.pos) & self.mask())
    }

    /// Writes `data` to the field, keeping the other bits of the register.
    pub fn write<R: RegisterAccess + ?Sized>(
        &self,
        reg: &mut R,
        data: u32,
    ) -> Result<(), QubeDriverError> {
        if data > self.mask() {
            return Err(QubeDriverError::out_of_range(
                "register data",
                data as f64,
                0.0,
                self.mask() as f64,
            ));
        }
        let current = reg.read_register(self.addr, self.offset)?;
        let value = (current & !(self.mask() << self.pos)) | (data << self.pos);
        reg.write_register(self.addr, self.offset, value)?;
        Ok(())
    }

    /// Writes `data` if given, then reads the field back.
    pub fn access<R: RegisterAccess + ?Sized>(
        &self,
        reg: &mut R,
        data: Option<u32>,
    ) -> Result<u32, QubeDriverError> {
        if let Some(data) = data {
            self.write(reg, data)?;
        }
        self.read(reg)
    }
}
