quantity!(Watts, "W");
quantity!(Volts, "V");
quantity!(Amperes, "A");
