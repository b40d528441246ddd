/*!

This module is for managing errors in the code of tornoc. To avoid invoking `panic!` in favor of a more graceful exit. Cases that should never happen can be kept as `panic!`.

Instead of `expect` or `unwrap_or_else` try
* `map_err` like in `.map_err(|e|Error::bad_argument(source_location!()).with_message(format!("{e}")))?;`
* `ok_or_else` like in `.ok_or_else( ||Error::undetermined(source_location!()) )?;`

The `error!` macro may easy up the writing a little. E.g., `error!(undetermined)` or `error!(ill_formed_configuration,cv.clone())`.

To include arbitrary messages use the `with_message` method, like as `Error::undetermined(source_location!()).with_message(format!("A text like in a panic: {}",thing_to_dump))`.

*/

use std::fmt::{Display,Formatter};

use crate::config::ConfigurationValue;

/// The main Error class to be used in each `Result(Whatever,Error)`.
/// It contains the code source of the error and its kind.
/// An arbitrary `String` message can be optionally attached.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// A source code location where an error occurred.
/// Contains the values of the macros `std::{file,line,column}`.
#[derive(Debug)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// A component was built from a configuration value it cannot make sense of.
	IllFormedConfiguration{
		value: ConfigurationValue,
	},
	/// The routing table of a router has no entry towards some destination.
	NoRouteTowardsDestination{
		router: usize,
		destination: usize,
	},
	/// Some method received a bad argument. There should be an attached message with further explanation.
	BadArgument,
	/// Any other error. Better to add new types than to use this thing.
	Undetermined,
}

// source_location!()
#[macro_export]
macro_rules! source_location{
	() => {
		SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}
#[macro_export]
macro_rules! error{
	($kind:ident,$($args:tt)*) => {{
		Error::$kind( source_location!(), $($args)* )
	}};
	($kind:ident) => {{
		Error::$kind( source_location!() )
	}};
}

use ErrorKind::*;

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message:None,
		}
	}
	pub fn with_message(mut self,message:String) -> Error
	{
		match self.message
		{
			Some(ref mut text) => *text += &message,
			None => self.message=Some(message),
		}
		self
	}
	pub fn ill_formed_configuration(source_location:SourceLocation,value:ConfigurationValue)->Error
	{
		Error{
			source_location,
			kind: IllFormedConfiguration{
				value,
			},
			message:None,
		}
	}
	pub fn no_route_towards_destination(source_location:SourceLocation,router:usize,destination:usize)->Error
	{
		Error{
			source_location,
			kind: NoRouteTowardsDestination{
				router,
				destination,
			},
			message:None,
		}
	}
	pub fn bad_argument(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: BadArgument,
			message:None,
		}
	}
	pub fn undetermined(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: Undetermined,
			message:None,
		}
	}
}

impl Display for SourceLocation
{
	fn fmt(&self, formatter:&mut Formatter) -> Result<(),std::fmt::Error>
	{
		write!(formatter,"{}:{}:{}",self.file,self.line,self.column)
	}
}

impl Display for ErrorKind
{
	fn fmt(&self, formatter:&mut Formatter) -> Result<(),std::fmt::Error>
	{
		match self
		{
			IllFormedConfiguration{value} => write!(formatter,"Ill-formed configuration value {:?}",value),
			NoRouteTowardsDestination{router,destination} => write!(formatter,"No route exists from router {} towards destination {}",router,destination),
			BadArgument => write!(formatter,"Some method received a bad argument"),
			Undetermined => write!(formatter,"Undetermined error"),
		}
	}
}

impl Display for Error
{
	fn fmt(&self, formatter:&mut Formatter) -> Result<(),std::fmt::Error>
	{
		write!(formatter,"Error at {}: {}",self.source_location,self.kind)?;
		if let Some(ref message) = self.message
		{
			write!(formatter,"\n{}",message)?;
		}
		Ok(())
	}
}
