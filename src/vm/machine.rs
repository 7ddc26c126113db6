//! The machine itself: registers, RAM and the fetch-decode-execute cycle.

use std::collections::BTreeSet;

use crate::error::{DcError, DcResult};
use crate::isa::{self, Config, Opcode};
use crate::vm::interface::Interface;
use crate::vm::memory::Ram;
use crate::vm::register::Register;

/// The DC machine.
///
/// Owns the seven registers, the RAM, the running flag, the breakpoint
/// set and the auxiliary return-address set. All execution state changes
/// go through [`Machine::cycle`]; the machine does no locking and assumes
/// the caller serialises calls to `cycle`, `reset` and direct mutation.
#[derive(Debug, Clone)]
pub struct Machine {
    config: Config,
    ram: Ram,

    ir: Register,
    dr: Register,
    pc: Register,
    ac: Register,
    ar: Register,
    sp: Register,
    bp: Register,

    running: bool,

    /// Addresses at which [`Machine::cycle`] pauses with
    /// [`DcError::Breakpoint`].
    breakpoints: BTreeSet<u16>,

    /// Stack addresses holding return addresses pushed by `JSR`.
    /// Bookkeeping for UIs only; never load-bearing, and `RTN` tolerates
    /// missing entries silently.
    return_addresses: BTreeSet<u16>,
}

impl Machine {
    /// Build a machine for the given geometry. RAM is zero-filled, SP and
    /// BP start at the highest address, everything else at zero.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let aw = config.address_width;
        let cw = config.cell_width();
        Machine {
            config,
            ram: Ram::new(config.ram_len()),
            ir: Register::new("IR", cw),
            dr: Register::new("DR", cw),
            pc: Register::new("PC", aw),
            ac: Register::new("AC", cw),
            ar: Register::new("AR", aw),
            sp: Register::with_value("SP", aw, config.max_address()),
            bp: Register::with_value("BP", aw, config.max_address()),
            running: false,
            breakpoints: BTreeSet::new(),
            return_addresses: BTreeSet::new(),
        }
    }

    /// Reset all registers, the running flag, the return-address set and
    /// the RAM to their construction state. Breakpoints survive a reset.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.ir.set(0);
        self.dr.set(0);
        self.pc.set(0);
        self.ac.set(0);
        self.ar.set(0);
        self.sp.set(i32::from(self.config.max_address()));
        self.bp.set(i32::from(self.config.max_address()));
        self.running = false;
        self.return_addresses.clear();
        self.ram.clear();
    }

    /// The machine geometry.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of the RAM.
    #[must_use]
    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Mutable access to the RAM, for loaders and debug shells.
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// Instruction register.
    #[must_use]
    pub fn ir(&self) -> &Register {
        &self.ir
    }

    /// Data register.
    #[must_use]
    pub fn dr(&self) -> &Register {
        &self.dr
    }

    /// Program counter.
    #[must_use]
    pub fn pc(&self) -> &Register {
        &self.pc
    }

    /// Accumulator.
    #[must_use]
    pub fn ac(&self) -> &Register {
        &self.ac
    }

    /// Address register.
    #[must_use]
    pub fn ar(&self) -> &Register {
        &self.ar
    }

    /// Stack pointer.
    #[must_use]
    pub fn sp(&self) -> &Register {
        &self.sp
    }

    /// Base pointer.
    #[must_use]
    pub fn bp(&self) -> &Register {
        &self.bp
    }

    /// Point the program counter somewhere else (debug shells).
    pub fn set_pc(&mut self, addr: u16) {
        self.pc.set(i32::from(addr));
    }

    /// Whether the running flag is set.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set or clear the running flag.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// The configured breakpoint addresses.
    #[must_use]
    pub fn breakpoints(&self) -> &BTreeSet<u16> {
        &self.breakpoints
    }

    /// Arm a breakpoint.
    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    /// Disarm a breakpoint.
    pub fn remove_breakpoint(&mut self, addr: u16) {
        self.breakpoints.remove(&addr);
    }

    /// Arm the breakpoint if absent, disarm it if present.
    pub fn toggle_breakpoint(&mut self, addr: u16) {
        if !self.breakpoints.remove(&addr) {
            self.breakpoints.insert(addr);
        }
    }

    /// Stack addresses currently holding `JSR` return addresses.
    /// Diagnostic only (stack-frame highlighting in UIs).
    #[must_use]
    pub fn return_addresses(&self) -> &BTreeSet<u16> {
        &self.return_addresses
    }

    /// Disassemble a memory cell to its mnemonic (`"DEF"` for literals).
    #[must_use]
    pub fn command_name(&self, cell: u16) -> &'static str {
        isa::command_name(&self.config, cell)
    }

    /// Parse a textual command like `"JMP 15"` into a packed word.
    ///
    /// # Errors
    ///
    /// See [`isa::parse_command`].
    pub fn parse_command(&self, command: &str) -> DcResult<u16> {
        isa::parse_command(&self.config, command)
    }

    /// Set the running flag and cycle until something clears it.
    ///
    /// # Errors
    ///
    /// Stops at the first error a cycle reports (including
    /// [`DcError::Breakpoint`]) and propagates it; calling `run` again
    /// resumes from the current PC.
    pub fn run(&mut self, io: &mut dyn Interface) -> DcResult<()> {
        self.running = true;
        while self.running {
            self.cycle(io)?;
        }
        Ok(())
    }

    /// One fetch-decode-execute cycle.
    ///
    /// Fetches the cell at PC into IR (advancing PC), unconditionally
    /// pre-fetches the operand cell into DR, then dispatches. A cell
    /// whose opcode field matches no instruction is a `DEF` literal and
    /// executes as a no-op.
    ///
    /// # Errors
    ///
    /// Propagates handler errors ([`DcError::Overflow`],
    /// [`DcError::InvalidAddress`], [`DcError::NoInput`]) with machine
    /// state untouched by the failed instruction apart from the fetch and
    /// operand pre-fetch, and reports [`DcError::Breakpoint`] when the
    /// next PC is in the breakpoint set.
    pub fn cycle(&mut self, io: &mut dyn Interface) -> DcResult<()> {
        // Fetch.
        self.pc.to(&mut self.ar);
        self.fetch_to_dr()?;
        self.dr.to(&mut self.ir);
        self.pc.inc();

        // Decode.
        let (code, adr) = self.config.split(self.ir.value());

        // Operand pre-fetch. Happens for every instruction, including
        // register-only ones; PSHM depends on DR holding Memory[adr].
        self.ar.set(i32::from(adr));
        self.fetch_to_dr()?;

        // Dispatch. An unassigned opcode field is a DEF literal: the
        // cycle ends here with PC already advanced.
        let Some(opcode) = Opcode::from_code(code) else {
            return Ok(());
        };

        self.execute(opcode, adr, io)?;

        if self.running && self.breakpoints.contains(&self.pc.value()) {
            return Err(DcError::Breakpoint {
                addr: self.pc.value(),
            });
        }
        Ok(())
    }

    /// DR <- RAM[AR].
    fn fetch_to_dr(&mut self) -> DcResult<()> {
        let data = self.ram.get(self.ar.value())?;
        self.dr.set(i32::from(data));
        Ok(())
    }

    /// RAM[AR] <- DR.
    fn store_dr(&mut self) -> DcResult<()> {
        self.ram.set(self.ar.value(), self.dr.value())
    }

    /// PC <- AR.
    fn jump(&mut self) {
        self.ar.to(&mut self.pc);
    }

    /// AC <- AC + DR, trapping before the write if the signed result
    /// leaves the accumulator's range.
    fn checked_add(&mut self) -> DcResult<()> {
        if self
            .ac
            .will_overflow(self.ac.signed_value() + self.dr.signed_value())
        {
            return Err(DcError::Overflow);
        }
        self.ac = self.ac + self.dr;
        Ok(())
    }

    /// AC <- AC - DR, trapping before the write on overflow.
    fn checked_sub(&mut self) -> DcResult<()> {
        if self
            .ac
            .will_overflow(self.ac.signed_value() - self.dr.signed_value())
        {
            return Err(DcError::Overflow);
        }
        self.ac = self.ac - self.dr;
        Ok(())
    }

    /// AR <- base + x, bound-checked. Unlike bare PC/SP arithmetic, the
    /// indexed addressing modes never wrap: an address past the end of
    /// memory is an error, raised before AR is touched.
    fn index_ar(&mut self, base: u16, x: u16) -> DcResult<()> {
        let addr = base + x;
        if addr > self.config.max_address() {
            return Err(DcError::invalid_address(format!(
                "{base} + {x} is outside memory"
            )));
        }
        self.ar.set(i32::from(addr));
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, opcode: Opcode, adr: u16, io: &mut dyn Interface) -> DcResult<()> {
        match opcode {
            // ==================== Accumulator / memory ====================
            Opcode::Lda => self.dr.to(&mut self.ac),
            Opcode::Sta => {
                self.ac.to(&mut self.dr);
                self.store_dr()?;
            }
            Opcode::Add => self.checked_add()?,
            Opcode::Sub => self.checked_sub()?,
            Opcode::Nop => {}
            Opcode::Neg => self.ac.neg(),
            Opcode::Inc => {
                if self.ac.will_overflow(self.ac.signed_value() + 1) {
                    return Err(DcError::Overflow);
                }
                self.ac.inc();
            }
            Opcode::Dec => {
                if self.ac.will_overflow(self.ac.signed_value() - 1) {
                    return Err(DcError::Overflow);
                }
                self.ac.dec();
            }

            // ==================== Jumps ====================
            Opcode::Jmp => self.jump(),
            Opcode::Jms => {
                if self.ac.leftmost() {
                    self.jump();
                }
            }
            Opcode::Jpl => {
                if self.ac.signed_value() > 0 {
                    self.jump();
                }
            }
            Opcode::Jze => {
                if self.ac.signed_value() == 0 {
                    self.jump();
                }
            }
            Opcode::Jnm => {
                if !self.ac.leftmost() {
                    self.jump();
                }
            }
            Opcode::Jnp => {
                if self.ac.leftmost() || self.ac.value() == 0 {
                    self.jump();
                }
            }
            Opcode::Jnz => {
                if self.ac.signed_value() != 0 {
                    self.jump();
                }
            }

            // ==================== Subroutines ====================
            Opcode::Jsr => {
                // PC already points past the JSR; that is the return
                // address.
                self.pc.to(&mut self.dr);
                self.sp.to(&mut self.ar);
                self.store_dr()?;
                self.return_addresses.insert(self.sp.value());
                self.sp.dec();
                self.pc.set(i32::from(adr));
            }
            Opcode::Rtn => {
                self.sp.inc();
                self.sp.to(&mut self.ar);
                self.fetch_to_dr()?;
                // A missing entry means the program unbalanced the stack;
                // control still transfers through DR.
                self.return_addresses.remove(&self.sp.value());
                self.dr.to(&mut self.pc);
            }

            // ==================== Stack ====================
            Opcode::Psh => {
                self.sp.to(&mut self.ar);
                self.sp.dec();
                self.ac.to(&mut self.dr);
                self.store_dr()?;
            }
            Opcode::Pop => {
                self.sp.inc();
                self.sp.to(&mut self.ar);
                self.fetch_to_dr()?;
                self.dr.to(&mut self.ac);
            }
            Opcode::Pshm => {
                // DR still holds Memory[adr] from the operand pre-fetch.
                self.sp.to(&mut self.ar);
                self.store_dr()?;
                self.sp.dec();
            }
            Opcode::Popm => {
                self.sp.inc();
                self.sp.to(&mut self.ar);
                self.fetch_to_dr()?;
                // IR's low bits are the target address.
                self.ir.to(&mut self.ar);
                self.store_dr()?;
            }
            Opcode::Pshb => {
                self.bp.to(&mut self.dr);
                self.sp.to(&mut self.ar);
                self.store_dr()?;
                self.sp.dec();
            }
            Opcode::Popb => {
                self.sp.inc();
                self.sp.to(&mut self.ar);
                self.fetch_to_dr()?;
                self.dr.to(&mut self.bp);
            }
            Opcode::Spbp => self.sp.to(&mut self.bp),
            Opcode::Bpsp => self.bp.to(&mut self.sp),

            // ==================== Stack-relative addressing ====================
            Opcode::Ldas => {
                self.index_ar(self.sp.value(), adr)?;
                self.fetch_to_dr()?;
                self.dr.to(&mut self.ac);
            }
            Opcode::Stas => {
                self.index_ar(self.sp.value(), adr)?;
                self.ac.to(&mut self.dr);
                self.store_dr()?;
            }
            Opcode::Adds => {
                self.index_ar(self.sp.value(), adr)?;
                self.fetch_to_dr()?;
                self.checked_add()?;
            }
            Opcode::Subs => {
                self.index_ar(self.sp.value(), adr)?;
                self.fetch_to_dr()?;
                self.checked_sub()?;
            }

            // ==================== Base-relative addressing ====================
            Opcode::Ldab => {
                self.index_ar(self.bp.value(), adr)?;
                self.fetch_to_dr()?;
                self.dr.to(&mut self.ac);
            }
            Opcode::Stab => {
                self.index_ar(self.bp.value(), adr)?;
                self.ac.to(&mut self.dr);
                self.store_dr()?;
            }
            Opcode::Addb => {
                self.index_ar(self.bp.value(), adr)?;
                self.fetch_to_dr()?;
                self.checked_add()?;
            }
            Opcode::Subb => {
                self.index_ar(self.bp.value(), adr)?;
                self.fetch_to_dr()?;
                self.checked_sub()?;
            }

            // ==================== Input / output ====================
            Opcode::Out => io.show_output(self.dr.signed_value()),
            Opcode::Outs => {
                self.index_ar(self.sp.value(), adr)?;
                self.fetch_to_dr()?;
                io.show_output(self.dr.signed_value());
            }
            Opcode::Outb => {
                self.index_ar(self.bp.value(), adr)?;
                self.fetch_to_dr()?;
                io.show_output(self.dr.signed_value());
            }
            Opcode::Inm => match io.get_input() {
                Ok(value) => {
                    self.dr.set(value);
                    self.store_dr()?;
                }
                // Exhausted input is the normal end condition for
                // INM-driven programs: stop, don't fail.
                Err(DcError::NoInput) => self.running = false,
                Err(other) => return Err(other),
            },
            Opcode::Ins => {
                self.index_ar(self.sp.value(), adr)?;
                let value = io.get_input()?;
                self.dr.set(value);
                self.store_dr()?;
            }
            Opcode::Inb => {
                self.index_ar(self.bp.value(), adr)?;
                let value = io.get_input()?;
                self.dr.set(value);
                self.store_dr()?;
            }

            // ==================== Control ====================
            Opcode::End => self.running = false,
        }
        Ok(())
    }
}
