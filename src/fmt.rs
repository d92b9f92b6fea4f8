// Logging shims. With the `defmt` feature these forward to `defmt`, otherwise the arguments are
// only borrowed so that call sites compile identically in both configurations.

#![allow(unused_macros)]

macro_rules! trace {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::trace!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}

macro_rules! debug {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::debug!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}

macro_rules! warn {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::warn!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}
