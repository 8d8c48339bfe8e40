use super::LinkError;

/// Raw access to the 32-bit control registers of an IP block.
pub trait RegisterAccess {
    /// Reads the register at `offset` of the block at `addr`.
    fn read_register(&mut self, addr: u32, offset: u32) -> Result<u32, LinkError>;

    /// Writes the register at `offset` of the block at `addr`.
    fn write_register(&mut self, addr: u32, offset: u32, value: u32) -> Result<(), LinkError>;
}
