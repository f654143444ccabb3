//! The built-in XPath 1.0 function library.

use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<'a, 'input: 'a>(
    name: &str,
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match name {
        // Node-set
        "count" => func_count(args),
        "position" => Ok(XPathValue::Number(ctx.context_position as f64)),
        "last" => Ok(XPathValue::Number(ctx.context_size as f64)),
        "local-name" => func_local_name(args, ctx),
        "name" => func_name(args, ctx),

        // String
        "string" => func_string(args, ctx),
        "concat" => func_concat(args),
        "starts-with" => func_starts_with(args),
        "contains" => func_contains(args),
        "substring-before" => func_substring_before(args),
        "substring-after" => func_substring_after(args),
        "substring" => func_substring(args),
        "string-length" => func_string_length(args, ctx),
        "normalize-space" => func_normalize_space(args, ctx),
        "translate" => func_translate(args),

        // Boolean
        "boolean" => func_boolean(args),
        "not" => func_not(args),
        "true" => func_true(args),
        "false" => func_false(args),

        // Number
        "number" => func_number(args, ctx),
        "sum" => func_sum(args),
        "floor" => func_floor(args),
        "ceiling" => func_ceiling(args),
        "round" => func_round(args),

        _ => Err(XPathError::Function {
            function: name.to_string(),
            message: "Unknown XPath function".to_string(),
        }),
    }
}

fn arity_error(function: &str, expected: &str) -> XPathError {
    XPathError::Function {
        function: format!("{function}()"),
        message: format!("Expected {expected}"),
    }
}

// XPath rounding: round(x) is floor(x + 0.5), not banker's rounding.
fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

// --- Node-Set Functions ---

fn func_count<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match args.as_slice() {
        [XPathValue::NodeSet(nodes)] => Ok(XPathValue::Number(nodes.len() as f64)),
        [_] => Err(XPathError::Type(
            "count() requires a node-set argument".to_string(),
        )),
        _ => Err(arity_error("count", "1 argument")),
    }
}

fn func_local_name<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let name = match args.as_slice() {
        [] => ctx.context_node.local_name().map(str::to_string),
        [XPathValue::NodeSet(nodes)] => nodes.first().and_then(|n| n.local_name()).map(str::to_string),
        [_] => {
            return Err(XPathError::Type(
                "local-name() requires a node-set argument".to_string(),
            ));
        }
        _ => return Err(arity_error("local-name", "0 or 1 arguments")),
    };
    Ok(XPathValue::String(name.unwrap_or_default()))
}

fn func_name<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let name = match args.as_slice() {
        [] => ctx.context_node.qualified_name(),
        [XPathValue::NodeSet(nodes)] => nodes.first().and_then(|n| n.qualified_name()),
        [_] => {
            return Err(XPathError::Type(
                "name() requires a node-set argument".to_string(),
            ));
        }
        _ => return Err(arity_error("name", "0 or 1 arguments")),
    };
    Ok(XPathValue::String(name.unwrap_or_default()))
}

// --- String Functions ---

fn func_string<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match args.as_slice() {
        [] => Ok(XPathValue::String(ctx.context_node.string_value())),
        [value] => Ok(XPathValue::String(value.to_string())),
        _ => Err(arity_error("string", "0 or 1 arguments")),
    }
}

fn func_concat<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    if args.len() < 2 {
        return Err(arity_error("concat", "at least 2 arguments"));
    }
    let joined: String = args.iter().map(|v| v.to_string()).collect();
    Ok(XPathValue::String(joined))
}

fn two_strings<'a, 'input: 'a>(
    function: &str,
    args: &[XPathValue<'a, 'input>],
) -> Result<(String, String), XPathError> {
    match args {
        [a, b] => Ok((a.to_string(), b.to_string())),
        _ => Err(arity_error(function, "2 arguments")),
    }
}

fn func_starts_with<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let (haystack, prefix) = two_strings("starts-with", &args)?;
    Ok(XPathValue::Boolean(haystack.starts_with(&prefix)))
}

fn func_contains<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let (haystack, needle) = two_strings("contains", &args)?;
    Ok(XPathValue::Boolean(haystack.contains(&needle)))
}

fn func_substring_before<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let (haystack, needle) = two_strings("substring-before", &args)?;
    let result = haystack
        .find(&needle)
        .map(|pos| haystack[..pos].to_string())
        .unwrap_or_default();
    Ok(XPathValue::String(result))
}

fn func_substring_after<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let (haystack, needle) = two_strings("substring-after", &args)?;
    let result = haystack
        .find(&needle)
        .map(|pos| haystack[pos + needle.len()..].to_string())
        .unwrap_or_default();
    Ok(XPathValue::String(result))
}

fn func_substring<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(arity_error("substring", "2 or 3 arguments"));
    }
    let text = args[0].to_string();
    let start = args[1].to_number();
    if start.is_nan() {
        return Ok(XPathValue::String(String::new()));
    }
    let begin = round_half_up(start);
    let end = match args.get(2) {
        Some(length) => {
            let l = length.to_number();
            if l.is_nan() {
                return Ok(XPathValue::String(String::new()));
            }
            begin + round_half_up(l)
        }
        None => f64::INFINITY,
    };

    // Positions are 1-based and character-counted.
    let result: String = text
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= begin && pos < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}

fn func_string_length<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let text = match args.as_slice() {
        [] => ctx.context_node.string_value(),
        [value] => value.to_string(),
        _ => return Err(arity_error("string-length", "0 or 1 arguments")),
    };
    Ok(XPathValue::Number(text.chars().count() as f64))
}

fn func_normalize_space<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let text = match args.as_slice() {
        [] => ctx.context_node.string_value(),
        [value] => value.to_string(),
        _ => return Err(arity_error("normalize-space", "0 or 1 arguments")),
    };
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(XPathValue::String(normalized))
}

fn func_translate<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let [text, from, to] = args.as_slice() else {
        return Err(arity_error("translate", "3 arguments"));
    };
    let from: Vec<char> = from.to_string().chars().collect();
    let to: Vec<char> = to.to_string().chars().collect();
    let result: String = text
        .to_string()
        .chars()
        .filter_map(|c| match from.iter().position(|f| *f == c) {
            Some(index) => to.get(index).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(result))
}

// --- Boolean Functions ---

fn func_boolean<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match args.as_slice() {
        [value] => Ok(XPathValue::Boolean(value.to_boolean())),
        _ => Err(arity_error("boolean", "1 argument")),
    }
}

fn func_not<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match args.as_slice() {
        [value] => Ok(XPathValue::Boolean(!value.to_boolean())),
        _ => Err(arity_error("not", "1 argument")),
    }
}

fn func_true<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    if !args.is_empty() {
        return Err(arity_error("true", "0 arguments"));
    }
    Ok(XPathValue::Boolean(true))
}

fn func_false<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    if !args.is_empty() {
        return Err(arity_error("false", "0 arguments"));
    }
    Ok(XPathValue::Boolean(false))
}

// --- Number Functions ---

fn func_number<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let n = match args.as_slice() {
        [] => XPathValue::String(ctx.context_node.string_value()).to_number(),
        [value] => value.to_number(),
        _ => return Err(arity_error("number", "0 or 1 arguments")),
    };
    Ok(XPathValue::Number(n))
}

fn func_sum<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match args.as_slice() {
        [XPathValue::NodeSet(nodes)] => {
            let total: f64 = nodes
                .iter()
                .map(|n| {
                    let s = n.string_value();
                    s.trim().parse().unwrap_or(f64::NAN)
                })
                .sum();
            Ok(XPathValue::Number(total))
        }
        [_] => Err(XPathError::Type(
            "sum() requires a node-set argument".to_string(),
        )),
        _ => Err(arity_error("sum", "1 argument")),
    }
}

fn one_number<'a, 'input: 'a>(
    function: &str,
    args: &[XPathValue<'a, 'input>],
) -> Result<f64, XPathError> {
    match args {
        [value] => Ok(value.to_number()),
        _ => Err(arity_error(function, "1 argument")),
    }
}

fn func_floor<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    Ok(XPathValue::Number(one_number("floor", &args)?.floor()))
}

fn func_ceiling<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    Ok(XPathValue::Number(one_number("ceiling", &args)?.ceil()))
}

fn func_round<'a, 'input: 'a>(
    args: Vec<XPathValue<'a, 'input>>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let n = one_number("round", &args)?;
    if n.is_nan() || n.is_infinite() {
        return Ok(XPathValue::Number(n));
    }
    Ok(XPathValue::Number(round_half_up(n)))
}
