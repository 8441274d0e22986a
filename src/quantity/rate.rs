quantity!(KilowattHourRate, "/kWh");
