mod awg;
mod capture;
mod lsi;
mod sequencer;
