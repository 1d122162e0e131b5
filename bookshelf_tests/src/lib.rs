//! End to end scenarios: the typed client against a catalogue service
//! served in process on a random port.
