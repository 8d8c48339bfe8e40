use std::collections::BTreeMap;

use qube_core::link::LinkError;

use crate::check_broken;

#[derive(Default)]
pub(crate) struct Registers {
    values: BTreeMap<(u32, u32), u32>,
}

impl Registers {
    pub(crate) fn get(&self, addr: u32, offset: u32) -> u32 {
        self.values.get(&(addr, offset)).copied().unwrap_or(0)
    }

    pub(crate) fn read(&self, broken: bool, addr: u32, offset: u32) -> Result<u32, LinkError> {
        check_broken(broken)?;
        if offset % 4 != 0 {
            return Err(LinkError::new(format!("unaligned register offset: {offset:#x}")));
        }
        Ok(self.get(addr, offset))
    }

    pub(crate) fn write(
        &mut self,
        broken: bool,
        addr: u32,
        offset: u32,
        value: u32,
    ) -> Result<(), LinkError> {
        self.read(broken, addr, offset)?;
        self.values.insert((addr, offset), value);
        Ok(())
    }
}
