/*!

The configuration of a simulation is a tree of `ConfigurationValue`s. The host binary is in charge of parsing whatever syntax it prefers into this tree; this crate only consumes already built values.

An `Object` is a named record, as in `Torus { num_ary: 3, num_dim: 2 }`. Components are built from the `Object` matching their name, with the `match_object_panic!` macro destructuring the fields. Unknown fields and wrong value types are fatal; a malformed configuration cannot produce correct cycle accounts.

*/

use crate::error::{Error,SourceLocation};
use crate::error;
use crate::source_location;
use crate::event::Time;

///The values in a configuration.
#[derive(Clone,Debug,PartialEq)]
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
}

impl ConfigurationValue
{
	pub fn as_bool(&self) -> Result<bool,Error>
	{
		match self
		{
			&ConfigurationValue::True => Ok(true),
			&ConfigurationValue::False => Ok(false),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_str(&self) -> Result<&str,Error>
	{
		match self
		{
			&ConfigurationValue::Literal(ref s) => Ok(s),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_f64(&self) -> Result<f64,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) => Ok(x),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_usize(&self) -> Result<usize,Error>
	{
		self.as_f64().map(|x|x as usize)
	}
	pub fn as_time(&self) -> Result<Time,Error>
	{
		self.as_f64().map(|x|x as Time)
	}
	pub fn as_array(&self) -> Result<&Vec<ConfigurationValue>,Error>
	{
		match self
		{
			&ConfigurationValue::Array(ref a) => Ok(a),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	///Get the name when the value is an `Object`.
	pub fn name(&self) -> Result<&str,Error>
	{
		match self
		{
			&ConfigurationValue::Object(ref name,ref _pairs) => Ok(name),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
}

/// match arms against the keys of an object, panicking on errors.
/// first argument, `$cv:expr`, is the ConfigurationValue expected to be the object
/// second argument, `$name:literal`, is the name the Object should have.
/// third argument, `$valueid:ident`, is the variable name capturing the value in the object's elements
///    and can be used in the arms
/// the remaining arguments are the arms of the match.
#[macro_export]
macro_rules! match_object_panic{
	($cv:expr, $name:literal, $valueid:ident ) => {{
		match_object_panic!($cv,[$name],$valueid,)
	}};
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		match_object_panic!($cv,[$name],$valueid,$($arm)*)
	}};
	($cv:expr, $names:expr, $valueid:ident, $($arm:tt)* ) => {{
		if let &$crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if !$names.iter().any(|&x|x==cv_name)
			{
				if $names.len()==1 {
					panic!("A {} must be created from a `{}` object not `{}`",$names[0],$names[0],cv_name);
				} else {
					panic!("Trying to create either of `{:?}` object from `{}`",$names,cv_name);
				}
			}
			for &(ref name,ref $valueid) in cv_pairs
			{
				match AsRef::<str>::as_ref(&name)
				{
					$( $arm )*
					"legend_name" => (),
					_ => panic!("Nothing to do with field {} in {}",name,$names[0]),
				}
			}
		}
		else
		{
			panic!("Trying to create a {} from a non-Object",$names[0]);
		}
	}};
}
