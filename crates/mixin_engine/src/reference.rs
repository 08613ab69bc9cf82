//! Declarations loaded into every universe before user sources.
//!
//! Templates routinely name framework types (`List<T>`, `Math`,
//! `IEquatable<T>`), and keyword types must resolve to their system
//! declarations. The reference source only declares shapes; bodies are never
//! composed.

/// Module name the reference declarations are registered under.
pub const REFERENCE_MODULE: &str = "System.Runtime";

/// Framework declarations.
pub const REFERENCE_SOURCE: &str = r"
namespace System
{
    public class Object { }
    public sealed class String { }
    public struct Boolean { }
    public struct Byte { }
    public struct SByte { }
    public struct Char { }
    public struct Decimal { }
    public struct Double { }
    public struct Single { }
    public struct Int16 { }
    public struct UInt16 { }
    public struct Int32 { }
    public struct UInt32 { }
    public struct Int64 { }
    public struct UInt64 { }
    public struct IntPtr { }
    public struct Void { }
    public struct DateTime { }
    public struct TimeSpan { }
    public struct Guid { }
    public struct Nullable<T> where T : struct { }
    public abstract class Type { }
    public abstract class Array { }
    public abstract class Delegate { }
    public abstract class Attribute { }
    public class EventArgs { }
    public class EventHandler { }
    public class EventHandler<TEventArgs> { }
    public class Action { }
    public class Action<T> { }
    public class Action<T1, T2> { }
    public class Action<T1, T2, T3> { }
    public class Func<TResult> { }
    public class Func<T, TResult> { }
    public class Func<T1, T2, TResult> { }
    public class Func<T1, T2, T3, TResult> { }
    public class Lazy<T> { }
    public class Random { }
    public static class Math { }
    public static class Console { }
    public static class Convert { }
    public class Exception { }
    public class SystemException : Exception { }
    public class ArgumentException : SystemException { }
    public class ArgumentNullException : ArgumentException { }
    public class ArgumentOutOfRangeException : ArgumentException { }
    public class InvalidOperationException : SystemException { }
    public class NotSupportedException : SystemException { }
    public class NotImplementedException : SystemException { }
    public class IndexOutOfRangeException : SystemException { }
    public class ObjectDisposedException : InvalidOperationException { }
    public interface IDisposable { }
    public interface ICloneable { }
    public interface IFormattable { }
    public interface IComparable { }
    public interface IComparable<in T> { }
    public interface IEquatable<T> { }
    public sealed class AttributeUsageAttribute : Attribute { }
    public sealed class ObsoleteAttribute : Attribute { }
    public sealed class SerializableAttribute : Attribute { }
    public class FlagsAttribute : Attribute { }
}

namespace System.Collections
{
    public interface IEnumerable { }
    public interface IEnumerator { }
    public interface ICollection : IEnumerable { }
    public interface IList : ICollection { }
}

namespace System.Collections.Generic
{
    public interface IEnumerable<out T> : System.Collections.IEnumerable { }
    public interface IEnumerator<out T> : System.IDisposable, System.Collections.IEnumerator { }
    public interface ICollection<T> : IEnumerable<T> { }
    public interface IList<T> : ICollection<T> { }
    public interface IReadOnlyCollection<out T> : IEnumerable<T> { }
    public interface IReadOnlyList<out T> : IReadOnlyCollection<T> { }
    public interface IDictionary<TKey, TValue> { }
    public interface IReadOnlyDictionary<TKey, TValue> { }
    public interface ISet<T> : ICollection<T> { }
    public interface IComparer<in T> { }
    public interface IEqualityComparer<in T> { }
    public class List<T> : IList<T>, IReadOnlyList<T> { }
    public class Dictionary<TKey, TValue> : IDictionary<TKey, TValue> { }
    public class HashSet<T> : ISet<T> { }
    public class Queue<T> : IReadOnlyCollection<T> { }
    public class Stack<T> : IReadOnlyCollection<T> { }
    public class LinkedList<T> : ICollection<T> { }
    public class SortedDictionary<TKey, TValue> : IDictionary<TKey, TValue> { }
    public struct KeyValuePair<TKey, TValue> { }
    public abstract class Comparer<T> : IComparer<T> { }
    public abstract class EqualityComparer<T> : IEqualityComparer<T> { }
}

namespace System.Linq
{
    public static class Enumerable { }
}

namespace System.Text
{
    public sealed class StringBuilder { }
}

namespace System.IO
{
    public abstract class Stream : System.IDisposable { }
    public abstract class TextReader : System.IDisposable { }
    public abstract class TextWriter : System.IDisposable { }
}

namespace System.Threading
{
    public struct CancellationToken { }
}

namespace System.Threading.Tasks
{
    public class Task { }
    public class Task<TResult> : Task { }
}

namespace System.Diagnostics
{
    public static class Debug { }
}

namespace System.CodeDom.Compiler
{
    public sealed class GeneratedCodeAttribute : System.Attribute
    {
        public GeneratedCodeAttribute(string tool, string version) { }
    }
}
";

/// Annotation declarations, registered under the configured annotation module.
pub const ANNOTATION_SOURCE: &str = r"
namespace Mixin
{
    public sealed class MixinAttribute : System.Attribute
    {
        public MixinAttribute(System.Type template) { }
    }

    public sealed class SubstituteAttribute : System.Attribute
    {
    }
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use mixin_syntax::parse;

    #[test]
    fn reference_source_parses() {
        let unit = parse(REFERENCE_SOURCE).unwrap();
        assert!(unit.members.len() > 5);
    }

    #[test]
    fn annotation_source_parses() {
        let unit = parse(ANNOTATION_SOURCE).unwrap();
        assert_eq!(unit.members.len(), 1);
    }
}
